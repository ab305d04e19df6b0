/// Domain models for Taskboard
///
/// # Models
///
/// - `project`: Named groupings of tasks owned by a single user
/// - `task`: Units of work with a three-state status
/// - `status_counts`: Task counts keyed by status label
/// - `nullable`: Serde helper separating absent fields from explicit nulls
///
/// PostgreSQL operations live on the model types themselves
/// (`Project::create`, `Task::update`, ...). Handlers should go through
/// [`crate::store::DocumentStore`] rather than calling them directly.

pub mod nullable;
pub mod project;
pub mod status_counts;
pub mod task;

pub use project::{CreateProject, Project};
pub use status_counts::{StatusCounts, UNKNOWN_STATUS};
pub use task::{CreateTask, InvalidStatus, StatusTransition, Task, TaskPatch, TaskStatus};
