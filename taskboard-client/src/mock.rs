/// In-process [`TaskboardApi`] for tests and demos
///
/// Answers from a shared [`MemoryStore`] on behalf of one signed-in user and
/// follows the server's rules for the cases the board cares about: missing
/// fields, ownership, and missing tasks.
///
/// # Knobs
///
/// - [`MockApi::with_latency`]: every call sleeps first, so a test can cancel
///   a fetch while it is in flight
/// - [`MockApi::fail_next`]: the next call fails with the given error
/// - [`MemoryStore::set_unavailable`] on [`MockApi::store`]: every call fails
///   with a `500` and the server's message for that operation
///
/// # Example
///
/// ```
/// use taskboard_client::api::{NewProject, TaskboardApi};
/// use taskboard_client::mock::MockApi;
///
/// # async fn example() -> Result<(), taskboard_client::error::ClientError> {
/// let api = MockApi::new("alice");
/// let id = api.create_project(&NewProject {
///     name: "Chores".to_string(),
///     description: None,
///     owner_id: "alice".to_string(),
/// }).await?;
///
/// assert_eq!(api.list_projects("alice").await?[0].id, id);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskboard_shared::analytics::{aggregate_status_counts, AnalyticsError, StatusReport};
use taskboard_shared::models::{CreateProject, CreateTask, Project, Task};
use taskboard_shared::store::{DocumentStore, MemoryStore};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::api::{NewProject, NewTask, TaskUpdate, TaskboardApi};
use crate::error::{ClientError, ClientResult};

/// Mock API bound to one user
#[derive(Debug, Clone)]
pub struct MockApi {
    store: MemoryStore,
    user_id: String,
    latency: Duration,
    injected: Arc<Mutex<Option<ClientError>>>,
}

impl MockApi {
    /// Empty store, signed in as `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_store(MemoryStore::new(), user_id)
    }

    /// Existing store, signed in as `user_id`
    pub fn with_store(store: MemoryStore, user_id: impl Into<String>) -> Self {
        MockApi {
            store,
            user_id: user_id.into(),
            latency: Duration::ZERO,
            injected: Arc::new(Mutex::new(None)),
        }
    }

    /// Delays every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Backing store
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Makes the next call fail with `error`
    pub async fn fail_next(&self, error: ClientError) {
        *self.injected.lock().await = Some(error);
    }

    async fn begin(&self) -> ClientResult<()> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        match self.injected.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn owned_project(&self, project_id: &str, not_found: &str) -> ClientResult<Project> {
        let project = self
            .store
            .get_project(project_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to fetch project"))?;

        match project {
            Some(project) if project.is_owned_by(&self.user_id) => Ok(project),
            _ => Err(ClientError::status(404, not_found)),
        }
    }

    async fn owned_task(&self, task_id: &str) -> ClientResult<Task> {
        let task = self
            .store
            .get_task(task_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to fetch task"))?
            .ok_or_else(|| ClientError::status(404, "Task not found"))?;

        self.owned_project(&task.project_id, "Task not found").await?;
        Ok(task)
    }

    fn ensure_caller(&self, user_id: &str) -> ClientResult<()> {
        if user_id != self.user_id {
            return Err(ClientError::status(
                403,
                "Cannot act on behalf of another user",
            ));
        }
        Ok(())
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[async_trait]
impl TaskboardApi for MockApi {
    async fn list_projects(&self, user_id: &str) -> ClientResult<Vec<Project>> {
        self.begin().await?;
        if blank(user_id) {
            return Err(ClientError::status(400, "Missing userId"));
        }
        self.ensure_caller(user_id)?;

        self.store
            .list_projects_by_owner(user_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to fetch projects"))
    }

    async fn create_project(&self, project: &NewProject) -> ClientResult<String> {
        self.begin().await?;
        if blank(&project.name) || blank(&project.owner_id) {
            return Err(ClientError::status(400, "Missing fields"));
        }
        self.ensure_caller(&project.owner_id)?;

        let created = self
            .store
            .create_project(CreateProject {
                name: project.name.clone(),
                description: project.description.clone(),
                owner_id: project.owner_id.clone(),
            })
            .await
            .map_err(|_| ClientError::status(500, "Failed to create project"))?;

        Ok(created.id)
    }

    async fn list_tasks(&self, project_id: &str) -> ClientResult<Vec<Task>> {
        self.begin().await?;
        if blank(project_id) {
            return Err(ClientError::status(400, "Missing projectId"));
        }
        self.owned_project(project_id, "Project not found").await?;

        self.store
            .list_tasks_by_project(project_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to fetch tasks"))
    }

    async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        self.begin().await?;
        if blank(&task.title) || blank(&task.project_id) {
            return Err(ClientError::status(400, "Missing fields"));
        }
        self.owned_project(&task.project_id, "Project not found").await?;

        self.store
            .create_task(CreateTask {
                project_id: task.project_id.clone(),
                title: task.title.clone(),
                description: task.description.clone().unwrap_or_default(),
                status: task.status.unwrap_or_default(),
                assigned_to: task.assigned_to.clone().filter(|v| !v.is_empty()),
                due_date: task.due_date,
                created_by: task.created_by.clone().filter(|v| !v.is_empty()),
            })
            .await
            .map_err(|_| ClientError::status(500, "Failed to create task"))
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> ClientResult<Task> {
        self.begin().await?;
        if matches!(update.title.as_deref(), Some("")) {
            return Err(ClientError::status(400, "Title cannot be empty"));
        }
        self.owned_task(task_id).await?;

        let found = self
            .store
            .update_task(task_id, update.to_patch())
            .await
            .map_err(|_| ClientError::status(500, "Failed to update task"))?;
        if !found {
            return Err(ClientError::status(404, "Task not found"));
        }

        self.store
            .get_task(task_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to update task"))?
            .ok_or_else(|| ClientError::status(404, "Task not found"))
    }

    async fn delete_task(&self, task_id: &str) -> ClientResult<String> {
        self.begin().await?;
        self.owned_task(task_id).await?;

        let deleted = self
            .store
            .delete_task(task_id)
            .await
            .map_err(|_| ClientError::status(500, "Failed to delete task"))?;
        if !deleted {
            return Err(ClientError::status(404, "Task not found"));
        }

        Ok(task_id.to_string())
    }

    async fn analytics(&self, user_id: &str, project_id: Option<&str>) -> ClientResult<StatusReport> {
        self.begin().await?;
        if blank(user_id) {
            return Err(ClientError::status(400, "Missing userId"));
        }
        self.ensure_caller(user_id)?;

        aggregate_status_counts(&self.store, user_id, project_id)
            .await
            .map_err(|e| match e {
                AnalyticsError::NotFoundOrForbidden => {
                    ClientError::status(404, "Project not found or access denied")
                }
                AnalyticsError::Store(_) => ClientError::status(500, "Failed to fetch analytics"),
            })
    }
}
