/// Cancellable board operations
///
/// Each function runs one API call against a [`BoardState`], applying a
/// pending outcome before the call and the final outcome after it, and
/// returns the final [`FetchOutcome`].
///
/// # Cancellation
///
/// Every call races a [`CancellationToken`]. If the token fires first the
/// call is dropped, whatever the function changed up front is put back, and
/// [`FetchOutcome::Cancelled`] is returned. A write that already reached the
/// server may still take effect there.
///
/// # Example
///
/// ```
/// use taskboard_client::actions;
/// use taskboard_client::mock::MockApi;
/// use taskboard_client::state::BoardState;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let api = MockApi::new("alice");
/// let mut state = BoardState::new();
/// let cancel = CancellationToken::new();
///
/// actions::load_projects(&api, &mut state, "alice", &cancel).await;
/// assert!(state.projects.is_empty());
/// # }
/// ```

use std::future::Future;
use taskboard_shared::models::StatusTransition;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{NewTask, TaskUpdate, TaskboardApi};
use crate::state::{BoardState, FetchOutcome};

/// Runs `call` unless `cancel` fires first
async fn run_cancellable<F: Future>(cancel: &CancellationToken, call: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = call => Some(output),
    }
}

fn finish(state: &mut BoardState, outcome: FetchOutcome) -> FetchOutcome {
    if let Some(message) = outcome.error() {
        warn!(error = %message, "Board operation failed");
    }
    state.apply(outcome.clone());
    outcome
}

/// Loads the user's projects
///
/// Selects the first project when none is selected yet.
pub async fn load_projects(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    user_id: &str,
    cancel: &CancellationToken,
) -> FetchOutcome {
    if user_id.trim().is_empty() {
        return finish(state, FetchOutcome::ProjectsFailed("No userId provided".to_string()));
    }

    let previous = state.projects_fetch.clone();
    state.apply(FetchOutcome::ProjectsPending);

    let outcome = match run_cancellable(cancel, api.list_projects(user_id)).await {
        None => {
            debug!(user_id = %user_id, "Project fetch cancelled");
            state.projects_fetch = previous;
            return FetchOutcome::Cancelled;
        }
        Some(Ok(projects)) => FetchOutcome::ProjectsLoaded(projects),
        Some(Err(e)) => FetchOutcome::ProjectsFailed(e.rejection_message()),
    };

    finish(state, outcome)
}

/// Makes `project_id` current and loads its tasks
///
/// Cancelling puts the previous selection and its tasks back.
pub async fn load_tasks(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    project_id: &str,
    cancel: &CancellationToken,
) -> FetchOutcome {
    if project_id.trim().is_empty() {
        return finish(
            state,
            FetchOutcome::TasksFailed {
                project_id: project_id.to_string(),
                message: "No projectId provided".to_string(),
            },
        );
    }

    let previous_project = state.current_project_id.clone();
    let previous_tasks = state.tasks.clone();
    let previous = state.tasks_fetch.clone();
    state.select_project(project_id);
    state.apply(FetchOutcome::TasksPending {
        project_id: project_id.to_string(),
    });

    let outcome = match run_cancellable(cancel, api.list_tasks(project_id)).await {
        None => {
            debug!(project_id = %project_id, "Task fetch cancelled");
            state.current_project_id = previous_project;
            state.tasks = previous_tasks;
            state.tasks_fetch = previous;
            return FetchOutcome::Cancelled;
        }
        Some(Ok(tasks)) => FetchOutcome::TasksLoaded {
            project_id: project_id.to_string(),
            tasks,
        },
        Some(Err(e)) => FetchOutcome::TasksFailed {
            project_id: project_id.to_string(),
            message: e.rejection_message(),
        },
    };

    finish(state, outcome)
}

/// Creates a task, showing it as pending until the server answers
pub async fn create_task(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    draft: NewTask,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let correlation_id = state.add_task_optimistic(draft.clone());

    let outcome = match run_cancellable(cancel, api.create_task(&draft)).await {
        None => {
            state.discard_pending(correlation_id);
            return FetchOutcome::Cancelled;
        }
        Some(Ok(task)) => FetchOutcome::TaskCreated {
            correlation_id,
            task,
        },
        Some(Err(e)) => FetchOutcome::TaskCreateFailed {
            correlation_id,
            message: e.rejection_message(),
        },
    };

    finish(state, outcome)
}

/// Updates a task, applying the change locally first
///
/// On failure the local change stays and the error is recorded.
pub async fn update_task(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    task_id: &str,
    update: TaskUpdate,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let previous = state.update_task_optimistic(task_id, &update);

    let outcome = match run_cancellable(cancel, api.update_task(task_id, &update)).await {
        None => {
            if let Some(previous) = previous {
                state.replace_task(previous);
            }
            return FetchOutcome::Cancelled;
        }
        Some(Ok(task)) => FetchOutcome::TaskUpdated(task),
        Some(Err(e)) => FetchOutcome::TaskUpdateFailed {
            task_id: task_id.to_string(),
            message: e.rejection_message(),
        },
    };

    finish(state, outcome)
}

/// Runs a status quick action on a task
///
/// Only actions offered for the task's current status are sent. The board
/// shows the new status once the server confirms it; a failure leaves the
/// task as it was and records the message.
pub async fn apply_transition(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    task_id: &str,
    transition: &StatusTransition,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let offered = state
        .task(task_id)
        .map(|task| task.available_transitions().contains(transition));

    match offered {
        Some(true) => {}
        Some(false) => {
            return finish(
                state,
                FetchOutcome::TaskUpdateFailed {
                    task_id: task_id.to_string(),
                    message: format!("Action '{}' is not available for this task", transition.label),
                },
            );
        }
        None => {
            return finish(
                state,
                FetchOutcome::TaskUpdateFailed {
                    task_id: task_id.to_string(),
                    message: "Task not found".to_string(),
                },
            );
        }
    }

    debug!(task_id = %task_id, target = %transition.target, "Applying status transition");

    let update = TaskUpdate::status(transition.target);
    let outcome = match run_cancellable(cancel, api.update_task(task_id, &update)).await {
        None => return FetchOutcome::Cancelled,
        Some(Ok(task)) => FetchOutcome::TaskUpdated(task),
        Some(Err(e)) => FetchOutcome::TaskUpdateFailed {
            task_id: task_id.to_string(),
            message: e.rejection_message(),
        },
    };

    finish(state, outcome)
}

/// Deletes a task
pub async fn delete_task(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    task_id: &str,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let outcome = match run_cancellable(cancel, api.delete_task(task_id)).await {
        None => return FetchOutcome::Cancelled,
        Some(Ok(task_id)) => FetchOutcome::TaskDeleted { task_id },
        Some(Err(e)) => FetchOutcome::TaskDeleteFailed {
            task_id: task_id.to_string(),
            message: e.rejection_message(),
        },
    };

    finish(state, outcome)
}

/// Loads status counts, across all projects or for one
pub async fn fetch_analytics(
    api: &dyn TaskboardApi,
    state: &mut BoardState,
    user_id: &str,
    project_id: Option<&str>,
    cancel: &CancellationToken,
) -> FetchOutcome {
    if user_id.trim().is_empty() {
        return finish(state, FetchOutcome::AnalyticsFailed("No userId provided".to_string()));
    }

    let previous = state.analytics_fetch.clone();
    state.apply(FetchOutcome::AnalyticsPending);

    let outcome = match run_cancellable(cancel, api.analytics(user_id, project_id)).await {
        None => {
            state.analytics_fetch = previous;
            return FetchOutcome::Cancelled;
        }
        Some(Ok(report)) => FetchOutcome::AnalyticsLoaded(report),
        Some(Err(e)) => FetchOutcome::AnalyticsFailed(e.rejection_message()),
    };

    finish(state, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewProject;
    use crate::error::ClientError;
    use crate::mock::MockApi;
    use crate::state::{FetchState, TaskEntry};
    use std::time::Duration;
    use taskboard_shared::models::{TaskPatch, TaskStatus};
    use taskboard_shared::store::DocumentStore;

    async fn api_with_project() -> (MockApi, String) {
        let api = MockApi::new("alice");
        let project_id = api
            .create_project(&NewProject {
                name: "Launch".to_string(),
                description: Some("Q3 launch".to_string()),
                owner_id: "alice".to_string(),
            })
            .await
            .unwrap();
        (api, project_id)
    }

    fn draft(title: &str, project_id: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            project_id: project_id.to_string(),
            ..Default::default()
        }
    }

    async fn loaded_board(api: &MockApi, project_id: &str, titles: &[&str]) -> BoardState {
        for title in titles {
            api.create_task(&draft(title, project_id)).await.unwrap();
        }
        let mut state = BoardState::new();
        let cancel = CancellationToken::new();
        load_projects(api, &mut state, "alice", &cancel).await;
        load_tasks(api, &mut state, project_id, &cancel).await;
        state
    }

    #[tokio::test]
    async fn test_load_projects_selects_first() {
        let (api, project_id) = api_with_project().await;
        let mut state = BoardState::new();

        let outcome = load_projects(&api, &mut state, "alice", &CancellationToken::new()).await;

        assert!(matches!(outcome, FetchOutcome::ProjectsLoaded(ref p) if p.len() == 1));
        assert_eq!(state.projects_fetch, FetchState::Fulfilled);
        assert_eq!(state.current_project_id, Some(project_id));
    }

    #[tokio::test]
    async fn test_load_projects_without_user_rejected() {
        let api = MockApi::new("alice");
        let mut state = BoardState::new();

        load_projects(&api, &mut state, "", &CancellationToken::new()).await;

        assert_eq!(state.projects_fetch.error(), Some("No userId provided"));
    }

    #[tokio::test]
    async fn test_load_projects_failure_uses_fallback_message() {
        let api = MockApi::new("alice");
        api.fail_next(ClientError::Status {
            status: 401,
            message: None,
        })
        .await;
        let mut state = BoardState::new();

        load_projects(&api, &mut state, "alice", &CancellationToken::new()).await;

        assert_eq!(
            state.projects_fetch.error(),
            Some("You are not authorized. Please log in.")
        );
    }

    #[tokio::test]
    async fn test_cancelled_fetch_restores_state() {
        let (api, _) = api_with_project().await;
        let api = api.with_latency(Duration::from_secs(5));
        let mut state = BoardState::new();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let outcome = load_projects(&api, &mut state, "alice", &cancel).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(state.projects_fetch, FetchState::Idle);
        assert!(state.projects.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_switch_keeps_previous_project() {
        let (api, first) = api_with_project().await;
        let second = api
            .create_project(&NewProject {
                name: "Ops".to_string(),
                description: None,
                owner_id: "alice".to_string(),
            })
            .await
            .unwrap();
        let mut state = loaded_board(&api, &first, &["Ship it"]).await;
        let before = state.tasks.clone();

        let slow = api.clone().with_latency(Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let outcome = load_tasks(&slow, &mut state, &second, &cancel).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(state.current_project_id, Some(first));
        assert_eq!(state.tasks, before);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks_fetch, FetchState::Fulfilled);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_call() {
        let (api, project_id) = api_with_project().await;
        let mut state = BoardState::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = create_task(&api, &mut state, draft("never", &project_id), &cancel).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert!(state.tasks.is_empty());
        assert_eq!(api.store().task_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_task_reconciles_by_correlation_id() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &[]).await;

        let outcome = create_task(
            &api,
            &mut state,
            draft("Write announcement", &project_id),
            &CancellationToken::new(),
        )
        .await;

        let created = match outcome {
            FetchOutcome::TaskCreated { task, .. } => task,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(state.tasks, vec![TaskEntry::Saved(created.clone())]);
        assert_eq!(created.current_status(), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn test_create_task_failure_drops_pending_entry() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &[]).await;

        let outcome = create_task(
            &api,
            &mut state,
            draft("", &project_id),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(outcome, FetchOutcome::TaskCreateFailed { .. }));
        assert!(state.tasks.is_empty());
        assert_eq!(state.last_error.as_deref(), Some("Missing fields"));
    }

    #[tokio::test]
    async fn test_transition_moves_task_between_columns() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Draft copy"]).await;
        let task_id = state.column(TaskStatus::Todo)[0].task().unwrap().id.clone();
        let start = state.task(&task_id).unwrap().available_transitions()[0];
        assert_eq!(start.label, "Start");

        let outcome = apply_transition(&api, &mut state, &task_id, &start, &CancellationToken::new()).await;

        assert!(matches!(outcome, FetchOutcome::TaskUpdated(_)));
        assert!(state.column(TaskStatus::Todo).is_empty());
        assert_eq!(state.column(TaskStatus::InProgress).len(), 1);

        let labels: Vec<&str> = state
            .task(&task_id)
            .unwrap()
            .available_transitions()
            .iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels, vec!["To Do", "Done"]);
    }

    #[tokio::test]
    async fn test_transition_keeps_concurrent_edits() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Draft copy"]).await;
        let task_id = state.tasks[0].task().unwrap().id.clone();
        api.store()
            .update_task(
                &task_id,
                TaskPatch {
                    title: Some("Final copy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let start = state.task(&task_id).unwrap().available_transitions()[0];

        apply_transition(&api, &mut state, &task_id, &start, &CancellationToken::new()).await;

        let stored = api.store().get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Final copy");
        assert_eq!(stored.current_status(), Some(TaskStatus::InProgress));
        assert_eq!(state.task(&task_id).unwrap().title, "Final copy");
    }

    #[tokio::test]
    async fn test_transition_not_offered_is_rejected_locally() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Draft copy"]).await;
        let task_id = state.tasks[0].task().unwrap().id.clone();
        let reopen = TaskStatus::Done.transitions()[0];

        let outcome = apply_transition(&api, &mut state, &task_id, &reopen, &CancellationToken::new()).await;

        assert_eq!(
            outcome.error(),
            Some("Action 'Reopen' is not available for this task")
        );
        let stored = api.store().get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(stored.current_status(), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn test_transition_failure_keeps_task_and_records_error() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Draft copy"]).await;
        let task_id = state.tasks[0].task().unwrap().id.clone();
        let start = TaskStatus::Todo.transitions()[0];
        api.store().set_unavailable(true);

        let outcome = apply_transition(&api, &mut state, &task_id, &start, &CancellationToken::new()).await;

        assert!(matches!(outcome, FetchOutcome::TaskUpdateFailed { .. }));
        assert_eq!(state.last_error.as_deref(), Some("Failed to fetch task"));
        assert_eq!(
            state.task(&task_id).unwrap().current_status(),
            Some(TaskStatus::Todo)
        );
    }

    #[tokio::test]
    async fn test_update_task_keeps_other_fields() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Book venue"]).await;
        let before = state.tasks[0].task().unwrap().clone();

        let update = TaskUpdate {
            assigned_to: Some(Some("bob".to_string())),
            ..Default::default()
        };
        let outcome = update_task(&api, &mut state, &before.id, update, &CancellationToken::new()).await;

        let after = match outcome {
            FetchOutcome::TaskUpdated(task) => task,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(after.assigned_to.as_deref(), Some("bob"));
        assert_eq!(after.title, before.title);
        assert_eq!(after.status, before.status);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(state.task(&before.id), Some(&after));
    }

    #[tokio::test]
    async fn test_delete_missing_task_reports_not_found() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Keep me"]).await;

        let outcome = delete_task(&api, &mut state, "missing", &CancellationToken::new()).await;

        assert_eq!(outcome.error(), Some("Task not found"));
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(api.store().task_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_task_removes_entry() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["Remove me"]).await;
        let task_id = state.tasks[0].task().unwrap().id.clone();

        let outcome = delete_task(&api, &mut state, &task_id, &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::TaskDeleted { task_id });
        assert!(state.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_analytics() {
        let (api, project_id) = api_with_project().await;
        let mut state = loaded_board(&api, &project_id, &["a", "b"]).await;
        let cancel = CancellationToken::new();

        fetch_analytics(&api, &mut state, "alice", None, &cancel).await;

        let report = state.analytics.clone().unwrap();
        assert_eq!(report.status_counts.get("Todo"), 2);
        assert_eq!(report.project_count, 1);
        assert_eq!(state.analytics_fetch, FetchState::Fulfilled);

        let outcome = fetch_analytics(&api, &mut state, "alice", Some("elsewhere"), &cancel).await;
        assert_eq!(outcome.error(), Some("Project not found or access denied"));
        assert_eq!(state.analytics, Some(report));
    }
}
