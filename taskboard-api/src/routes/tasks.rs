/// Task endpoints
///
/// # Endpoints
///
/// ```text
/// GET    /tasks?projectId=<id>
/// POST   /tasks             {title, projectId, description?, status?, assignedTo?, dueDate?, createdBy?}
/// PUT    /tasks/:task_id    any subset of {title, description, status, assignedTo, dueDate}
/// DELETE /tasks/:task_id
/// ```
///
/// # Ownership
///
/// Tasks carry no owner. Every operation resolves the task's project and
/// requires the caller to own it; a foreign project is reported exactly
/// like a missing one.
///
/// # Update Semantics
///
/// A field absent from the body is left alone. An explicit `null` clears
/// nullable fields. `updatedAt` is refreshed on every update, even an
/// empty one.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::projects::required,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::{nullable, CreateTask, Project, Task, TaskPatch, TaskStatus};
use tracing::{debug, info};
use validator::Validate;

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub project_id: Option<String>,
}

/// List tasks response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
}

/// Create task request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<String>,
}

/// Update task request
///
/// Nullable fields use a double `Option` so that "absent" and `null` stay
/// distinct.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub assigned_to: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Delete task response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub message: String,
    pub id: String,
}

#[derive(Validate)]
struct TextLimits {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    description: Option<String>,
}

fn parse_status(label: &str) -> ApiResult<TaskStatus> {
    label
        .parse::<TaskStatus>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Loads `project_id` if the caller owns it
///
/// `not_found` is the message used for both a missing and a foreign project.
async fn owned_project(
    state: &AppState,
    auth: &AuthContext,
    project_id: &str,
    not_found: &str,
) -> ApiResult<Project> {
    let project = state
        .store
        .get_project(project_id)
        .await
        .map_err(|e| ApiError::server("Failed to fetch project", e))?;

    match project {
        Some(project) if project.is_owned_by(&auth.user_id) => Ok(project),
        Some(_) => {
            debug!(project_id = %project_id, user_id = %auth.user_id, "Project owned by another user");
            Err(ApiError::NotFound(not_found.to_string()))
        }
        None => Err(ApiError::NotFound(not_found.to_string())),
    }
}

/// Loads a task whose project the caller owns
async fn owned_task(state: &AppState, auth: &AuthContext, task_id: &str) -> ApiResult<Task> {
    let task = state
        .store
        .get_task(task_id)
        .await
        .map_err(|e| ApiError::server("Failed to fetch task", e))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    owned_project(state, auth, &task.project_id, "Task not found").await?;

    Ok(task)
}

/// Lists tasks in `projectId`
///
/// # Errors
///
/// - `400 Bad Request`: `projectId` missing
/// - `404 Not Found`: project missing or not owned by the caller
/// - `500 Internal Server Error`: store failure
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListTasksResponse>> {
    let project_id = required(query.project_id)
        .ok_or_else(|| ApiError::MissingParameter("Missing projectId".to_string()))?;

    owned_project(&state, &auth, &project_id, "Project not found").await?;

    let tasks = state
        .store
        .list_tasks_by_project(&project_id)
        .await
        .map_err(|e| ApiError::server("Failed to fetch tasks", e))?;

    Ok(Json(ListTasksResponse { tasks }))
}

/// Creates a task
///
/// Status defaults to `Todo` and description to an empty string. Empty
/// strings count as absent: an empty status gets the default and an empty
/// `assignedTo` or `createdBy` is stored as null.
///
/// # Errors
///
/// - `400 Bad Request`: `title` or `projectId` missing, unknown status, or
///   malformed body
/// - `404 Not Found`: project missing or not owned by the caller
/// - `422 Unprocessable Entity`: field too long
/// - `500 Internal Server Error`: store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let (title, project_id) = match (required(req.title), required(req.project_id)) {
        (Some(title), Some(project_id)) => (title, project_id),
        _ => return Err(ApiError::MissingParameter("Missing fields".to_string())),
    };

    TextLimits {
        title: Some(title.clone()),
        description: req.description.clone(),
    }
    .validate()?;

    let status = match required(req.status) {
        Some(label) => parse_status(&label)?,
        None => TaskStatus::default(),
    };

    owned_project(&state, &auth, &project_id, "Project not found").await?;

    let task = state
        .store
        .create_task(CreateTask {
            project_id,
            title,
            description: req.description.unwrap_or_default(),
            status,
            assigned_to: required(req.assigned_to),
            due_date: req.due_date,
            created_by: required(req.created_by),
        })
        .await
        .map_err(|e| ApiError::server("Failed to create task", e))?;

    info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Applies a partial update to a task
///
/// The write and the confirmatory read are separate store calls; a
/// concurrent delete in between surfaces as `404`.
///
/// # Errors
///
/// - `400 Bad Request`: empty title, unknown or null status, malformed body
/// - `404 Not Found`: task missing, or its project is not the caller's
/// - `422 Unprocessable Entity`: field too long
/// - `500 Internal Server Error`: store failure
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    if matches!(req.title.as_deref(), Some("")) {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }

    TextLimits {
        title: req.title.clone(),
        description: req.description.clone().flatten(),
    }
    .validate()?;

    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        status: match req.status {
            Some(Some(label)) => Some(parse_status(&label)?),
            Some(None) => return Err(ApiError::BadRequest("Status cannot be null".to_string())),
            None => None,
        },
        assigned_to: req.assigned_to,
        due_date: req.due_date,
    };

    owned_task(&state, &auth, &task_id).await?;

    let found = state
        .store
        .update_task(&task_id, patch)
        .await
        .map_err(|e| ApiError::server("Failed to update task", e))?;

    if !found {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    let task = state
        .store
        .get_task(&task_id)
        .await
        .map_err(|e| ApiError::server("Failed to update task", e))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    info!(task_id = %task.id, status = ?task.status, "Task updated");

    Ok(Json(task))
}

/// Deletes a task
///
/// # Errors
///
/// - `404 Not Found`: task missing, or its project is not the caller's
/// - `500 Internal Server Error`: store failure
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    owned_task(&state, &auth, &task_id).await?;

    let deleted = state
        .store
        .delete_task(&task_id)
        .await
        .map_err(|e| ApiError::server("Failed to delete task", e))?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    info!(task_id = %task_id, "Task deleted");

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
        id: task_id,
    }))
}
