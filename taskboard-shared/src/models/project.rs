/// Project model and database operations
///
/// A project is a named grouping of tasks owned by exactly one user.
/// Projects are created through the API and never mutated afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     description TEXT,
///     owner_id TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Website relaunch".to_string(),
///     description: None,
///     owner_id: "user-123".to_string(),
/// }).await?;
///
/// let owned = Project::list_by_owner(&pool, "user-123").await?;
/// assert!(owned.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Store-assigned identifier
    pub id: String,

    /// Display name (never empty)
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Identifier of the owning user
    pub owner_id: String,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
}

impl Project {
    /// Builds a project record with a freshly generated identifier
    pub fn new(data: CreateProject) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            owner_id: data.owner_id,
        }
    }

    /// Returns true if `user_id` owns this project
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Inserts a new project
    ///
    /// No deduplication: two calls with identical input produce two projects.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = Project::new(data);

        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, name, description, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, owner_id
            "#,
        )
        .bind(project.id)
        .bind(project.name)
        .bind(project.description)
        .bind(project.owner_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists every project owned by a user
    pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id
            FROM projects
            WHERE owner_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }
}
