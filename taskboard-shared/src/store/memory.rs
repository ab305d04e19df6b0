//! In-memory document store.
//!
//! Holds projects and tasks in maps behind a `tokio::sync::RwLock`. Data
//! lives as long as the store value (and its clones). Intended for tests and
//! local development; it offers no durability.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, StoreResult};
use crate::models::{CreateProject, CreateTask, Project, Task, TaskPatch};

#[derive(Debug, Default)]
struct Collections {
    projects: HashMap<String, Project>,
    tasks: HashMap<String, Task>,
}

/// [`DocumentStore`] backed by process memory
///
/// Cloning is cheap and clones share the same data.
///
/// [`MemoryStore::set_unavailable`] makes every operation fail with
/// [`StoreError::Unavailable`], which lets tests exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated backend failure
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts a task record as-is, bypassing defaults
    ///
    /// Useful for seeding records that the API would never write, such as
    /// tasks without a status.
    pub async fn insert_task(&self, task: Task) {
        self.collections
            .write()
            .await
            .tasks
            .insert(task.id.clone(), task);
    }

    /// Number of stored tasks
    pub async fn task_count(&self) -> usize {
        self.collections.read().await.tasks.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn sorted_tasks<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks.cloned().collect();
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    tasks
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Project>> {
        self.check_available()?;
        let collections = self.collections.read().await;

        let mut projects: Vec<Project> = collections
            .projects
            .values()
            .filter(|project| project.is_owned_by(owner_id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        self.check_available()?;
        Ok(self.collections.read().await.projects.get(id).cloned())
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        self.check_available()?;
        let project = Project::new(data);

        self.collections
            .write()
            .await
            .projects
            .insert(project.id.clone(), project.clone());

        Ok(project)
    }

    async fn list_tasks_by_project(&self, project_id: &str) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let collections = self.collections.read().await;

        Ok(sorted_tasks(
            collections
                .tasks
                .values()
                .filter(|task| task.project_id == project_id),
        ))
    }

    async fn list_tasks_in_projects(&self, project_ids: &[String]) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let collections = self.collections.read().await;

        Ok(sorted_tasks(
            collections
                .tasks
                .values()
                .filter(|task| project_ids.contains(&task.project_id)),
        ))
    }

    async fn get_task(&self, id: &str) -> StoreResult<Option<Task>> {
        self.check_available()?;
        Ok(self.collections.read().await.tasks.get(id).cloned())
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        self.check_available()?;
        let task = Task::new(data, Utc::now());

        self.collections
            .write()
            .await
            .tasks
            .insert(task.id.clone(), task.clone());

        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> StoreResult<bool> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        match collections.tasks.get_mut(id) {
            Some(task) => {
                task.apply_patch(patch, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: &str) -> StoreResult<bool> {
        self.check_available()?;
        Ok(self.collections.write().await.tasks.remove(id).is_some())
    }
}
