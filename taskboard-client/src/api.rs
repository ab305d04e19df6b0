/// Typed access to the Taskboard HTTP API
///
/// [`TaskboardApi`] is the seam between application state and transport:
/// [`HttpClient`] talks to a running server over `reqwest`, and
/// [`crate::mock::MockApi`] answers from process memory for tests.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::api::{HttpClient, TaskboardApi};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new("http://localhost:8080")?.with_token("eyJ...");
/// let projects = client.list_projects("user-42").await?;
/// println!("{} projects", projects.len());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use taskboard_shared::analytics::StatusReport;
use taskboard_shared::models::{Project, Task, TaskPatch, TaskStatus};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `POST /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_id: String,
}

/// Body of `POST /tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Body of `PUT /tasks/:id`
///
/// Outer `None` omits the field. For nullable fields `Some(None)` sends an
/// explicit `null`, which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    /// Update that only changes the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Same update as a store-level patch
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            assigned_to: self.assigned_to.clone(),
            due_date: self.due_date,
        }
    }

    /// Applies the update to a local copy of `task`
    ///
    /// `updated_at` is left alone; only the server assigns timestamps.
    pub fn apply_to(&self, task: &mut Task) {
        let updated_at = task.updated_at;
        task.apply_patch(self.to_patch(), updated_at);
    }
}

#[derive(Debug, Deserialize)]
struct ProjectsEnvelope {
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct TasksEnvelope {
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct IdEnvelope {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Operations the board needs from the backend
#[async_trait]
pub trait TaskboardApi: Send + Sync {
    /// Projects owned by `user_id`
    async fn list_projects(&self, user_id: &str) -> ClientResult<Vec<Project>>;

    /// Creates a project and returns its identifier
    async fn create_project(&self, project: &NewProject) -> ClientResult<String>;

    /// Tasks in `project_id`
    async fn list_tasks(&self, project_id: &str) -> ClientResult<Vec<Task>>;

    /// Creates a task and returns the stored record
    async fn create_task(&self, task: &NewTask) -> ClientResult<Task>;

    /// Partially updates a task and returns the stored record
    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> ClientResult<Task>;

    /// Deletes a task and returns the deleted identifier
    async fn delete_task(&self, task_id: &str) -> ClientResult<String>;

    /// Task counts by status
    async fn analytics(&self, user_id: &str, project_id: Option<&str>) -> ClientResult<StatusReport>;
}

/// [`TaskboardApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Client for the server at `base_url` with [`DEFAULT_TIMEOUT`]
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Client with a custom per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Invalid(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Sends `token` as a bearer credential on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces the bearer credential (e.g. after a token refresh)
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ClientError::Invalid(e.to_string())
            } else {
                ClientError::NoResponse(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TaskboardApi for HttpClient {
    async fn list_projects(&self, user_id: &str) -> ClientResult<Vec<Project>> {
        let request = self.http.get(self.url("/projects")).query(&[("userId", user_id)]);
        let envelope: ProjectsEnvelope = self.send(request).await?;
        Ok(envelope.projects)
    }

    async fn create_project(&self, project: &NewProject) -> ClientResult<String> {
        let request = self.http.post(self.url("/projects")).json(project);
        let created: IdEnvelope = self.send(request).await?;
        Ok(created.id)
    }

    async fn list_tasks(&self, project_id: &str) -> ClientResult<Vec<Task>> {
        let request = self.http.get(self.url("/tasks")).query(&[("projectId", project_id)]);
        let envelope: TasksEnvelope = self.send(request).await?;
        Ok(envelope.tasks)
    }

    async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        let request = self.http.post(self.url("/tasks")).json(task);
        self.send(request).await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> ClientResult<Task> {
        let request = self
            .http
            .put(self.url(&format!("/tasks/{}", task_id)))
            .json(update);
        self.send(request).await
    }

    async fn delete_task(&self, task_id: &str) -> ClientResult<String> {
        let request = self.http.delete(self.url(&format!("/tasks/{}", task_id)));
        let deleted: IdEnvelope = self.send(request).await?;
        Ok(deleted.id)
    }

    async fn analytics(&self, user_id: &str, project_id: Option<&str>) -> ClientResult<StatusReport> {
        let mut params = vec![("userId", user_id)];
        if let Some(project_id) = project_id {
            params.push(("projectId", project_id));
        }

        let request = self.http.get(self.url("/analytics")).query(&params);
        self.send(request).await
    }
}
