//! Board application state
//!
//! [`BoardState`] is a plain struct owned by the caller. It changes only by
//! applying [`FetchOutcome`] values, which the functions in
//! [`crate::actions`] produce as API calls start and finish.
//!
//! # Fetch States
//!
//! ```text
//! Idle ──start──▶ Pending ──ok──▶ Fulfilled
//!                    │
//!                    ├──err──▶ Rejected(message)
//!                    └──cancel──▶ (previous state restored)
//! ```
//!
//! # Optimistic Creates
//!
//! A new task is shown at once as [`TaskEntry::Pending`] under a
//! client-generated correlation id. The create outcome carries the same id:
//! success swaps the entry for the server record, failure removes it.

use chrono::NaiveDate;
use taskboard_shared::analytics::StatusReport;
use taskboard_shared::models::{Project, Task, TaskStatus};
use uuid::Uuid;

use crate::api::{NewTask, TaskUpdate};

/// Progress of one collection fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    /// Failed with a displayable message
    Rejected(String),
}

impl FetchState {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    /// Failure message, if rejected
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

/// A task row on the board
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEntry {
    /// Sent to the server, not yet confirmed
    Pending { correlation_id: Uuid, draft: NewTask },

    /// Confirmed server record
    Saved(Task),
}

impl TaskEntry {
    pub fn title(&self) -> &str {
        match self {
            TaskEntry::Pending { draft, .. } => &draft.title,
            TaskEntry::Saved(task) => &task.title,
        }
    }

    /// Board column; `None` for a saved task with an unknown status label
    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            TaskEntry::Pending { draft, .. } => Some(draft.status.unwrap_or_default()),
            TaskEntry::Saved(task) => task.current_status(),
        }
    }

    /// Server record, once confirmed
    pub fn task(&self) -> Option<&Task> {
        match self {
            TaskEntry::Saved(task) => Some(task),
            TaskEntry::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TaskEntry::Pending { .. })
    }

    fn has_id(&self, id: &str) -> bool {
        self.task().is_some_and(|task| task.id == id)
    }

    fn has_correlation_id(&self, id: Uuid) -> bool {
        matches!(self, TaskEntry::Pending { correlation_id, .. } if *correlation_id == id)
    }
}

/// Result of an API call, tagged by what it was for
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    ProjectsPending,
    ProjectsLoaded(Vec<Project>),
    ProjectsFailed(String),

    TasksPending { project_id: String },
    TasksLoaded { project_id: String, tasks: Vec<Task> },
    TasksFailed { project_id: String, message: String },

    TaskCreated { correlation_id: Uuid, task: Task },
    TaskCreateFailed { correlation_id: Uuid, message: String },

    TaskUpdated(Task),
    TaskUpdateFailed { task_id: String, message: String },

    TaskDeleted { task_id: String },
    TaskDeleteFailed { task_id: String, message: String },

    AnalyticsPending,
    AnalyticsLoaded(StatusReport),
    AnalyticsFailed(String),

    /// Call abandoned through its cancellation token
    Cancelled,
}

impl FetchOutcome {
    /// Error message carried by a failure outcome
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchOutcome::ProjectsFailed(message) | FetchOutcome::AnalyticsFailed(message) => {
                Some(message)
            }
            FetchOutcome::TasksFailed { message, .. }
            | FetchOutcome::TaskCreateFailed { message, .. }
            | FetchOutcome::TaskUpdateFailed { message, .. }
            | FetchOutcome::TaskDeleteFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Everything the board shows
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub projects: Vec<Project>,
    pub projects_fetch: FetchState,

    /// Project whose tasks are loaded
    pub current_project_id: Option<String>,
    pub tasks: Vec<TaskEntry>,
    pub tasks_fetch: FetchState,

    pub analytics: Option<StatusReport>,
    pub analytics_fetch: FetchState,

    /// Most recent failure message from any call
    pub last_error: Option<String>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds an outcome into the state
    ///
    /// Task list outcomes for a project other than the current one are
    /// ignored; they belong to a selection the user already left.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        if let Some(message) = outcome.error() {
            self.last_error = Some(message.to_string());
        }

        match outcome {
            FetchOutcome::ProjectsPending => self.projects_fetch = FetchState::Pending,
            FetchOutcome::ProjectsLoaded(projects) => {
                self.projects = projects;
                self.projects_fetch = FetchState::Fulfilled;
                if self.current_project_id.is_none() {
                    if let Some(first) = self.projects.first() {
                        self.current_project_id = Some(first.id.clone());
                    }
                }
            }
            FetchOutcome::ProjectsFailed(message) => {
                self.projects_fetch = FetchState::Rejected(message);
            }

            FetchOutcome::TasksPending { project_id } => {
                if self.is_current(&project_id) {
                    self.tasks_fetch = FetchState::Pending;
                }
            }
            FetchOutcome::TasksLoaded { project_id, tasks } => {
                if self.is_current(&project_id) {
                    let pending = std::mem::take(&mut self.tasks)
                        .into_iter()
                        .filter(TaskEntry::is_pending);
                    self.tasks = tasks.into_iter().map(TaskEntry::Saved).chain(pending).collect();
                    self.tasks_fetch = FetchState::Fulfilled;
                }
            }
            FetchOutcome::TasksFailed {
                project_id,
                message,
            } => {
                if self.is_current(&project_id) {
                    self.tasks_fetch = FetchState::Rejected(message);
                }
            }

            FetchOutcome::TaskCreated {
                correlation_id,
                task,
            } => {
                let position = self
                    .tasks
                    .iter()
                    .position(|entry| entry.has_correlation_id(correlation_id));
                match position {
                    Some(index) => self.tasks[index] = TaskEntry::Saved(task),
                    None => {
                        if self.is_current(&task.project_id) && self.task(&task.id).is_none() {
                            self.tasks.push(TaskEntry::Saved(task));
                        }
                    }
                }
            }
            FetchOutcome::TaskCreateFailed { correlation_id, .. } => {
                self.discard_pending(correlation_id);
            }

            FetchOutcome::TaskUpdated(task) => self.replace_task(task),
            FetchOutcome::TaskDeleted { task_id } => {
                self.tasks.retain(|entry| !entry.has_id(&task_id));
            }
            FetchOutcome::TaskUpdateFailed { .. } | FetchOutcome::TaskDeleteFailed { .. } => {}

            FetchOutcome::AnalyticsPending => self.analytics_fetch = FetchState::Pending,
            FetchOutcome::AnalyticsLoaded(report) => {
                self.analytics = Some(report);
                self.analytics_fetch = FetchState::Fulfilled;
            }
            FetchOutcome::AnalyticsFailed(message) => {
                self.analytics_fetch = FetchState::Rejected(message);
            }

            FetchOutcome::Cancelled => {}
        }
    }

    /// Switches the current project and clears its task list
    ///
    /// No-op when `project_id` is already current.
    pub fn select_project(&mut self, project_id: &str) {
        if self.is_current(project_id) {
            return;
        }
        self.current_project_id = Some(project_id.to_string());
        self.tasks.clear();
        self.tasks_fetch = FetchState::Idle;
    }

    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_project_id.as_deref()?;
        self.projects.iter().find(|project| project.id == id)
    }

    fn is_current(&self, project_id: &str) -> bool {
        self.current_project_id.as_deref() == Some(project_id)
    }

    /// Shows `draft` as a pending task and returns its correlation id
    pub fn add_task_optimistic(&mut self, draft: NewTask) -> Uuid {
        let correlation_id = Uuid::new_v4();
        self.tasks.push(TaskEntry::Pending {
            correlation_id,
            draft,
        });
        correlation_id
    }

    /// Removes the pending entry with `correlation_id`
    pub fn discard_pending(&mut self, correlation_id: Uuid) {
        self.tasks
            .retain(|entry| !entry.has_correlation_id(correlation_id));
    }

    /// Applies `update` to the local copy of a saved task
    ///
    /// Returns the task as it was before, or `None` if it is not on the board.
    pub fn update_task_optimistic(&mut self, task_id: &str, update: &TaskUpdate) -> Option<Task> {
        self.tasks.iter_mut().find_map(|entry| match entry {
            TaskEntry::Saved(task) if task.id == task_id => {
                let previous = task.clone();
                update.apply_to(task);
                Some(previous)
            }
            _ => None,
        })
    }

    /// Replaces the saved task with the same id, if present
    pub fn replace_task(&mut self, task: Task) {
        if let Some(entry) = self.tasks.iter_mut().find(|entry| entry.has_id(&task.id)) {
            *entry = TaskEntry::Saved(task);
        }
    }

    /// Saved task by id
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .filter_map(TaskEntry::task)
            .find(|task| task.id == task_id)
    }

    /// Entries in one board column, in list order
    pub fn column(&self, status: TaskStatus) -> Vec<&TaskEntry> {
        self.tasks
            .iter()
            .filter(|entry| entry.status() == Some(status))
            .collect()
    }

    /// All columns in board order
    pub fn columns(&self) -> Vec<(TaskStatus, Vec<&TaskEntry>)> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| (status, self.column(status)))
            .collect()
    }

    /// Saved tasks that are past due on `today`
    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter_map(TaskEntry::task)
            .filter(|task| task.is_overdue(today))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskboard_shared::models::CreateTask;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {}", id),
            description: None,
            owner_id: "alice".to_string(),
        }
    }

    fn task(id: &str, project_id: &str, status: TaskStatus) -> Task {
        let mut task = Task::new(
            CreateTask {
                project_id: project_id.to_string(),
                title: format!("Task {}", id),
                description: String::new(),
                status,
                assigned_to: None,
                due_date: None,
                created_by: None,
            },
            Utc::now(),
        );
        task.id = id.to_string();
        task
    }

    fn draft(title: &str, project_id: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            project_id: project_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_project_selected_after_load() {
        let mut state = BoardState::new();
        state.apply(FetchOutcome::ProjectsPending);
        assert!(state.projects_fetch.is_pending());

        state.apply(FetchOutcome::ProjectsLoaded(vec![project("p1"), project("p2")]));

        assert_eq!(state.projects_fetch, FetchState::Fulfilled);
        assert_eq!(state.current_project_id.as_deref(), Some("p1"));
        assert_eq!(state.current_project().map(|p| p.id.as_str()), Some("p1"));
    }

    #[test]
    fn test_existing_selection_kept_after_load() {
        let mut state = BoardState::new();
        state.select_project("p2");

        state.apply(FetchOutcome::ProjectsLoaded(vec![project("p1"), project("p2")]));

        assert_eq!(state.current_project_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_rejection_records_message() {
        let mut state = BoardState::new();
        state.apply(FetchOutcome::ProjectsFailed("Failed to fetch projects".to_string()));

        assert_eq!(state.projects_fetch.error(), Some("Failed to fetch projects"));
        assert_eq!(state.last_error.as_deref(), Some("Failed to fetch projects"));
    }

    #[test]
    fn test_created_task_replaces_pending_entry() {
        let mut state = BoardState::new();
        state.select_project("p1");
        let first = state.add_task_optimistic(draft("first", "p1"));
        let second = state.add_task_optimistic(draft("second", "p1"));
        assert!(state.tasks.iter().all(TaskEntry::is_pending));

        state.apply(FetchOutcome::TaskCreated {
            correlation_id: second,
            task: task("t2", "p1", TaskStatus::Todo),
        });

        assert_eq!(state.tasks.len(), 2);
        assert!(state.tasks[0].has_correlation_id(first));
        assert_eq!(state.tasks[1].task().map(|t| t.id.as_str()), Some("t2"));
    }

    #[test]
    fn test_failed_create_removes_pending_entry() {
        let mut state = BoardState::new();
        state.select_project("p1");
        let correlation_id = state.add_task_optimistic(draft("doomed", "p1"));

        state.apply(FetchOutcome::TaskCreateFailed {
            correlation_id,
            message: "Project not found".to_string(),
        });

        assert!(state.tasks.is_empty());
        assert_eq!(state.last_error.as_deref(), Some("Project not found"));
    }

    #[test]
    fn test_tasks_loaded_keeps_pending_entries() {
        let mut state = BoardState::new();
        state.select_project("p1");
        state.add_task_optimistic(draft("in flight", "p1"));

        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![task("t1", "p1", TaskStatus::Done)],
        });

        assert_eq!(state.tasks.len(), 2);
        assert_eq!(state.tasks[0].title(), "Task t1");
        assert!(state.tasks[1].is_pending());
        assert_eq!(state.tasks_fetch, FetchState::Fulfilled);
    }

    #[test]
    fn test_tasks_for_other_project_ignored() {
        let mut state = BoardState::new();
        state.select_project("p2");

        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![task("t1", "p1", TaskStatus::Todo)],
        });

        assert!(state.tasks.is_empty());
        assert_eq!(state.tasks_fetch, FetchState::Idle);
    }

    #[test]
    fn test_update_failure_is_not_rolled_back() {
        let mut state = BoardState::new();
        state.select_project("p1");
        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![task("t1", "p1", TaskStatus::Todo)],
        });

        let previous = state.update_task_optimistic("t1", &TaskUpdate::status(TaskStatus::InProgress));
        assert_eq!(previous.and_then(|t| t.current_status()), Some(TaskStatus::Todo));

        state.apply(FetchOutcome::TaskUpdateFailed {
            task_id: "t1".to_string(),
            message: "A server error occurred. Please try again later.".to_string(),
        });

        let task = state.task("t1").unwrap();
        assert_eq!(task.current_status(), Some(TaskStatus::InProgress));
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_columns_follow_board_order() {
        let mut state = BoardState::new();
        state.select_project("p1");
        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![
                task("t1", "p1", TaskStatus::Done),
                task("t2", "p1", TaskStatus::Todo),
                task("t3", "p1", TaskStatus::Todo),
            ],
        });
        state.add_task_optimistic(NewTask {
            status: Some(TaskStatus::InProgress),
            ..draft("pending", "p1")
        });

        let columns = state.columns();
        let sizes: Vec<(TaskStatus, usize)> =
            columns.iter().map(|(status, entries)| (*status, entries.len())).collect();

        assert_eq!(
            sizes,
            vec![
                (TaskStatus::Todo, 2),
                (TaskStatus::InProgress, 1),
                (TaskStatus::Done, 1),
            ]
        );
    }

    #[test]
    fn test_overdue_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut late = task("t1", "p1", TaskStatus::Todo);
        late.due_date = Some(today);
        let mut finished = task("t2", "p1", TaskStatus::Done);
        finished.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut upcoming = task("t3", "p1", TaskStatus::InProgress);
        upcoming.due_date = NaiveDate::from_ymd_opt(2024, 3, 11);

        let mut state = BoardState::new();
        state.select_project("p1");
        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![late, finished, upcoming],
        });

        let overdue: Vec<&str> = state.overdue_tasks(today).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(overdue, vec!["t1"]);
    }

    #[test]
    fn test_delete_removes_saved_task() {
        let mut state = BoardState::new();
        state.select_project("p1");
        state.apply(FetchOutcome::TasksLoaded {
            project_id: "p1".to_string(),
            tasks: vec![task("t1", "p1", TaskStatus::Todo), task("t2", "p1", TaskStatus::Todo)],
        });

        state.apply(FetchOutcome::TaskDeleted {
            task_id: "t1".to_string(),
        });

        assert!(state.task("t1").is_none());
        assert!(state.task("t2").is_some());
    }
}
