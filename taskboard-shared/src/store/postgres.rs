//! PostgreSQL-backed document store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DocumentStore, StoreResult};
use crate::db::pool::health_check;
use crate::models::{CreateProject, CreateTask, Project, Task, TaskPatch};

/// [`DocumentStore`] over a `sqlx` connection pool
///
/// Expects the schema from `taskboard-shared/migrations`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn list_tasks_by_project(&self, project_id: &str) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_tasks_in_projects(&self, project_ids: &[String]) -> StoreResult<Vec<Task>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Task::list_in_projects(&self.pool, project_ids).await?)
    }

    async fn get_task(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> StoreResult<bool> {
        Ok(Task::update(&self.pool, id, patch).await?)
    }

    async fn delete_task(&self, id: &str) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
