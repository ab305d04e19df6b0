/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `projects`: List and create projects
/// - `tasks`: Task CRUD
/// - `analytics`: Task status aggregation

pub mod analytics;
pub mod health;
pub mod projects;
pub mod tasks;
