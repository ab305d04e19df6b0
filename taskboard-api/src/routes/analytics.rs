/// Analytics endpoint
///
/// # Endpoint
///
/// ```text
/// GET /analytics?userId=<id>[&projectId=<id>]
/// ```
///
/// # Response
///
/// ```json
/// {
///   "statusCounts": { "Done": 1, "In Progress": 1, "Todo": 2 },
///   "projectId": null,
///   "projectCount": 2
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::{ensure_caller, required},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::analytics::{aggregate_status_counts, StatusReport};
use taskboard_shared::auth::middleware::AuthContext;

/// Query parameters for analytics
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub user_id: Option<String>,
    pub project_id: Option<String>,
}

/// Task counts by status for the caller's projects
///
/// An empty `projectId` is treated as absent.
///
/// # Errors
///
/// - `400 Bad Request`: `userId` missing
/// - `403 Forbidden`: `userId` is not the caller
/// - `404 Not Found`: `projectId` missing or not owned by the caller
/// - `500 Internal Server Error`: store failure
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<StatusReport>> {
    let user_id = required(query.user_id)
        .ok_or_else(|| ApiError::MissingParameter("Missing userId".to_string()))?;
    ensure_caller(&auth, &user_id)?;

    let project_id = required(query.project_id);
    let report = aggregate_status_counts(state.store.as_ref(), &user_id, project_id.as_deref()).await?;

    Ok(Json(report))
}
