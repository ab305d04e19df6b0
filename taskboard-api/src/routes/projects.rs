/// Project endpoints
///
/// # Endpoints
///
/// ```text
/// GET  /projects?userId=<id>
/// POST /projects   {name, description?, ownerId}
/// ```
///
/// Both require the `userId` / `ownerId` to be the authenticated caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::{CreateProject, Project};
use tracing::info;
use validator::Validate;

/// Query parameters for listing projects
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub user_id: Option<String>,
}

/// List projects response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub owner_id: Option<String>,
}

/// Identifier of a newly created record
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Returns `value` if present and non-empty
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Rejects requests made on behalf of another user
pub(crate) fn ensure_caller(auth: &AuthContext, user_id: &str) -> ApiResult<()> {
    if auth.is(user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Cannot act on behalf of another user".to_string(),
        ))
    }
}

/// Lists projects owned by `userId`
///
/// # Errors
///
/// - `400 Bad Request`: `userId` missing
/// - `403 Forbidden`: `userId` is not the caller
/// - `500 Internal Server Error`: store failure
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<ListProjectsResponse>> {
    let user_id = required(query.user_id)
        .ok_or_else(|| ApiError::MissingParameter("Missing userId".to_string()))?;
    ensure_caller(&auth, &user_id)?;

    let projects = state
        .store
        .list_projects_by_owner(&user_id)
        .await
        .map_err(|e| ApiError::server("Failed to fetch projects", e))?;

    Ok(Json(ListProjectsResponse { projects }))
}

/// Creates a project
///
/// Identical requests create distinct projects.
///
/// # Errors
///
/// - `400 Bad Request`: `name` or `ownerId` missing
/// - `403 Forbidden`: `ownerId` is not the caller
/// - `422 Unprocessable Entity`: field too long
/// - `500 Internal Server Error`: store failure
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    req.validate()?;

    let (name, owner_id) = match (required(req.name), required(req.owner_id)) {
        (Some(name), Some(owner_id)) => (name, owner_id),
        _ => return Err(ApiError::MissingParameter("Missing fields".to_string())),
    };
    ensure_caller(&auth, &owner_id)?;

    let project = state
        .store
        .create_project(CreateProject {
            name,
            description: req.description,
            owner_id,
        })
        .await
        .map_err(|e| ApiError::server("Failed to create project", e))?;

    info!(project_id = %project.id, owner_id = %project.owner_id, "Project created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: project.id })))
}
