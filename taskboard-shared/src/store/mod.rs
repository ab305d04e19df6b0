//! Document store access
//!
//! Handlers never talk to a database directly; they go through the
//! [`DocumentStore`] trait, which mirrors the handful of queries the
//! service needs over the `projects` and `tasks` collections.
//!
//! # Implementations
//!
//! - [`PgStore`]: PostgreSQL through `sqlx`
//! - [`MemoryStore`]: process-local maps, for tests and local runs
//!
//! # Consistency
//!
//! Every call is a single independent round trip. Nothing spans calls in a
//! transaction, so a write followed by a read may observe concurrent changes
//! in between. Failed calls are not retried.
//!
//! # Example
//!
//! ```
//! use taskboard_shared::models::CreateProject;
//! use taskboard_shared::store::{DocumentStore, MemoryStore};
//!
//! # async fn example() -> Result<(), taskboard_shared::store::StoreError> {
//! let store = MemoryStore::new();
//! let project = store.create_project(CreateProject {
//!     name: "Chores".to_string(),
//!     description: None,
//!     owner_id: "alice".to_string(),
//! }).await?;
//!
//! let owned = store.list_projects_by_owner("alice").await?;
//! assert_eq!(owned, vec![project]);
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::models::{CreateProject, CreateTask, Project, Task, TaskPatch};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Query and write operations over projects and tasks
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Verifies the backend answers
    async fn ping(&self) -> StoreResult<()>;

    /// Projects whose owner is `owner_id`
    async fn list_projects_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Project>>;

    /// Single project lookup
    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>>;

    /// Persists a new project under a fresh identifier
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    /// Tasks whose `project_id` equals `project_id`
    async fn list_tasks_by_project(&self, project_id: &str) -> StoreResult<Vec<Task>>;

    /// Tasks whose `project_id` is any of `project_ids`, in one query
    async fn list_tasks_in_projects(&self, project_ids: &[String]) -> StoreResult<Vec<Task>>;

    /// Single task lookup
    async fn get_task(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Persists a new task; both timestamps are set to the write time
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Writes the fields present in `patch` and refreshes `updated_at`
    ///
    /// Returns false if no task has this ID.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> StoreResult<bool>;

    /// Removes a task, returning false if it did not exist
    async fn delete_task(&self, id: &str) -> StoreResult<bool>;
}
