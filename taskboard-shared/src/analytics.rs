//! Task status aggregation
//!
//! Counts a user's tasks by status, either across every project they own
//! or for a single project.
//!
//! # Scope Resolution
//!
//! ```text
//! project_id given   → fetch that project
//!                      missing or owned by someone else → NotFoundOrForbidden
//!                      scope = [project_id]
//! project_id absent  → scope = ids of every project owned by the user
//!
//! scope empty        → empty counts, no task query
//! otherwise          → one set-membership query over tasks, folded by status
//! ```
//!
//! Nothing is cached; each call re-reads the store.
//!
//! # Example
//!
//! ```
//! use taskboard_shared::analytics::aggregate_status_counts;
//! use taskboard_shared::store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let report = aggregate_status_counts(&store, "alice", None).await?;
//! assert!(report.status_counts.is_empty());
//! assert_eq!(report.project_count, 0);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::StatusCounts;
use crate::store::{DocumentStore, StoreError};

/// Aggregation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Task counts by status label
    pub status_counts: StatusCounts,

    /// Project filter that was applied (`None` = all owned projects)
    pub project_id: Option<String>,

    /// Number of projects in scope
    pub project_count: usize,
}

/// Error type for aggregation
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Requested project does not exist or belongs to another user
    #[error("Project not found or access denied")]
    NotFoundOrForbidden,

    /// Store call failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts tasks by status for `user_id`, optionally limited to one project
///
/// # Errors
///
/// - [`AnalyticsError::NotFoundOrForbidden`] if `project_id` does not name a
///   project owned by `user_id`
/// - [`AnalyticsError::Store`] if any store read fails
pub async fn aggregate_status_counts(
    store: &dyn DocumentStore,
    user_id: &str,
    project_id: Option<&str>,
) -> Result<StatusReport, AnalyticsError> {
    let scope: Vec<String> = match project_id {
        Some(project_id) => {
            let project = store
                .get_project(project_id)
                .await?
                .filter(|project| project.is_owned_by(user_id))
                .ok_or(AnalyticsError::NotFoundOrForbidden)?;
            vec![project.id]
        }
        None => store
            .list_projects_by_owner(user_id)
            .await?
            .into_iter()
            .map(|project| project.id)
            .collect(),
    };

    let status_counts = if scope.is_empty() {
        StatusCounts::default()
    } else {
        let tasks = store.list_tasks_in_projects(&scope).await?;
        StatusCounts::from_tasks(&tasks)
    };

    debug!(
        user_id = %user_id,
        project_id = ?project_id,
        project_count = scope.len(),
        task_count = status_counts.total(),
        "Aggregated task status counts"
    );

    Ok(StatusReport {
        status_counts,
        project_id: project_id.map(str::to_string),
        project_count: scope.len(),
    })
}
