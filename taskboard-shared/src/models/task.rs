/// Task model and database operations
///
/// A task belongs to exactly one project and carries a status from a
/// three-value enumeration.
///
/// # State Machine
///
/// The status moves are advisory: they decide which quick actions a client
/// offers, the server accepts any valid status on update.
///
/// ```text
/// Todo ──Start──▶ In Progress ──Done──▶ Done
///   ▲                 │  ▲                │
///   └─────To Do───────┘  └────Reopen──────┘
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id TEXT PRIMARY KEY,
///     project_id TEXT NOT NULL,
///     title TEXT NOT NULL,
///     description TEXT,
///     status TEXT,
///     assigned_to TEXT,
///     due_date DATE,
///     created_by TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `status` is plain text in storage. Rows written by this codebase always
/// hold one of the three labels; rows written elsewhere may not.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    #[serde(rename = "Todo")]
    Todo,

    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,

    /// Finished
    #[serde(rename = "Done")]
    Done,
}

/// A quick action offered for a task in a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    /// Button label shown to the user
    pub label: &'static str,

    /// Status the task moves to
    pub target: TaskStatus,
}

const FROM_TODO: &[StatusTransition] = &[StatusTransition {
    label: "Start",
    target: TaskStatus::InProgress,
}];

const FROM_IN_PROGRESS: &[StatusTransition] = &[
    StatusTransition {
        label: "To Do",
        target: TaskStatus::Todo,
    },
    StatusTransition {
        label: "Done",
        target: TaskStatus::Done,
    },
];

const FROM_DONE: &[StatusTransition] = &[StatusTransition {
    label: "Reopen",
    target: TaskStatus::InProgress,
}];

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Label used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Quick actions available from this status
    pub fn transitions(&self) -> &'static [StatusTransition] {
        match self {
            TaskStatus::Todo => FROM_TODO,
            TaskStatus::InProgress => FROM_IN_PROGRESS,
            TaskStatus::Done => FROM_DONE,
        }
    }

    /// Checks if a quick action leads from this status to `target`
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        self.transitions().iter().any(|t| t.target == target)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of the three statuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{0}': expected one of Todo, In Progress, Done")]
pub struct InvalidStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier
    pub id: String,

    /// Owning project (immutable after creation)
    pub project_id: String,

    /// Title (never empty when written by the API)
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Stored status label (`None` for records written without one)
    pub status: Option<String>,

    /// Free-text assignee
    pub assigned_to: Option<String>,

    /// Due date
    pub due_date: Option<NaiveDate>,

    /// Creator identifier as supplied by the client
    pub created_by: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last written
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<String>,
}

/// Partial update for a task
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// Patch that only changes the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// True if no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }
}

impl Task {
    /// Builds a task record with a new identifier and both timestamps set to `now`
    pub fn new(data: CreateTask, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: data.project_id,
            title: data.title,
            description: Some(data.description),
            status: Some(data.status.as_str().to_string()),
            assigned_to: data.assigned_to,
            due_date: data.due_date,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parsed status, `None` if missing or not a known label
    pub fn current_status(&self) -> Option<TaskStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Quick actions for this task; empty when the stored status is unknown
    pub fn available_transitions(&self) -> &'static [StatusTransition] {
        self.current_status()
            .map(|status| status.transitions())
            .unwrap_or(&[])
    }

    /// Applies a patch in place and refreshes `updated_at`
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = Some(status.as_str().to_string());
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }

    /// Whether the task is past due on `today`
    ///
    /// Finished tasks are never overdue. A task due today already counts.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.due_date, self.current_status(), today)
    }

    /// Inserts a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = Task::new(data, Utc::now());

        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, project_id, title, description, status,
                               assigned_to, due_date, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, project_id, title, description, status, assigned_to,
                      due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.project_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.assigned_to)
        .bind(task.due_date)
        .bind(task.created_by)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, assigned_to,
                   due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the tasks of one project, oldest first
    pub async fn list_by_project(pool: &PgPool, project_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, assigned_to,
                   due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every task whose project is in `project_ids` (single query)
    pub async fn list_in_projects(
        pool: &PgPool,
        project_ids: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, assigned_to,
                   due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE project_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(project_ids.to_vec())
        .fetch_all(pool)
        .await
    }

    /// Writes the supplied fields and refreshes `updated_at`
    ///
    /// Returns false if no row has this ID.
    pub async fn update(pool: &PgPool, id: &str, patch: TaskPatch) -> Result<bool, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(title) = patch.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(assigned_to) = patch.assigned_to {
            query.push(", assigned_to = ").push_bind(assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }

        query.push(" WHERE id = ").push_bind(id.to_string());

        let result = query.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task, returning false if it did not exist
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Whether a task due on `due_date` is overdue as of the end of `today`
///
/// Returns false without a due date or when the task is done.
pub fn is_overdue(due_date: Option<NaiveDate>, status: Option<TaskStatus>, today: NaiveDate) -> bool {
    match due_date {
        Some(due) => status != Some(TaskStatus::Done) && due <= today,
        None => false,
    }
}

/// Due date pre-filled for new tasks: one week after `today`
pub fn default_due_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_task() -> Task {
        Task::new(
            CreateTask {
                project_id: "p1".to_string(),
                title: "Write report".to_string(),
                description: "Quarterly numbers".to_string(),
                status: TaskStatus::default(),
                assigned_to: Some("sam".to_string()),
                due_date: Some(date(2025, 6, 1)),
                created_by: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_status_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let parsed: TaskStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
    }

    #[test]
    fn test_from_str_rejects_other_labels() {
        assert_eq!("Todo".parse::<TaskStatus>(), Ok(TaskStatus::Todo));
        assert!("todo".parse::<TaskStatus>().is_err());
        assert!("Blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_transitions_from_todo() {
        let moves = TaskStatus::Todo.transitions();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].label, "Start");
        assert_eq!(moves[0].target, TaskStatus::InProgress);
    }

    #[test]
    fn test_transitions_from_in_progress() {
        let moves: Vec<_> = TaskStatus::InProgress
            .transitions()
            .iter()
            .map(|t| (t.label, t.target))
            .collect();
        assert_eq!(
            moves,
            vec![("To Do", TaskStatus::Todo), ("Done", TaskStatus::Done)]
        );
    }

    #[test]
    fn test_transitions_from_done() {
        let moves = TaskStatus::Done.transitions();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].label, "Reopen");
        assert_eq!(moves[0].target, TaskStatus::InProgress);
    }

    #[test]
    fn test_can_transition_to() {
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Todo.can_transition_to(TaskStatus::Done));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Todo));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_new_task_defaults() {
        let task = sample_task();
        assert_eq!(task.status.as_deref(), Some("Todo"));
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.current_status(), Some(TaskStatus::Todo));
    }

    #[test]
    fn test_unknown_status_has_no_transitions() {
        let mut task = sample_task();
        task.status = Some("todo".to_string());
        assert!(task.available_transitions().is_empty());

        task.status = None;
        assert!(task.available_transitions().is_empty());
    }

    #[test]
    fn test_apply_patch_only_touches_supplied_fields() {
        let mut task = sample_task();
        let before = task.clone();
        let later = before.updated_at + Duration::seconds(5);

        task.apply_patch(TaskPatch::status(TaskStatus::Done), later);

        assert_eq!(task.status.as_deref(), Some("Done"));
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.assigned_to, before.assigned_to);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.updated_at, later);
        assert_eq!(task.created_at, before.created_at);
    }

    #[test]
    fn test_apply_patch_null_clears_field() {
        let mut task = sample_task();
        task.apply_patch(
            TaskPatch {
                assigned_to: Some(None),
                due_date: Some(None),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(task.assigned_to, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.title, "Write report");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::status(TaskStatus::Todo).is_empty());
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2025, 6, 10);
        assert!(is_overdue(Some(date(2025, 6, 9)), Some(TaskStatus::Todo), today));
        assert!(is_overdue(Some(date(2025, 6, 10)), Some(TaskStatus::Todo), today));
        assert!(!is_overdue(Some(date(2025, 6, 11)), Some(TaskStatus::Todo), today));
        assert!(!is_overdue(Some(date(2025, 6, 1)), Some(TaskStatus::Done), today));
        assert!(is_overdue(Some(date(2025, 6, 1)), None, today));
        assert!(!is_overdue(None, Some(TaskStatus::InProgress), today));
    }

    #[test]
    fn test_default_due_date_is_a_week_out() {
        assert_eq!(default_due_date(date(2025, 12, 28)), date(2026, 1, 4));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["assignedTo"], "sam");
        assert_eq!(json["dueDate"], "2025-06-01");
        assert!(json["createdBy"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
