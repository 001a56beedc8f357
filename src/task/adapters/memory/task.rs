//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::OrganizationId;
use crate::task::{
    domain::{Task, TaskId, TaskQuery},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Helper to collect tasks matching a query.
fn matching(tasks: &HashMap<TaskId, Task>, query: &TaskQuery) -> Vec<Task> {
    tasks
        .values()
        .filter(|task| query.matches(task))
        .cloned()
        .collect()
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let stored = tasks
            .get_mut(&task.id())
            .filter(|stored| stored.organization_id() == task.organization_id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        if stored.revision() != task.revision() {
            return Err(TaskRepositoryError::StaleRevision {
                task_id: task.id(),
                expected: task.revision(),
            });
        }

        let next = task.clone().into_next_revision();
        *stored = next.clone();
        Ok(next)
    }

    async fn find_in_organization(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks
            .get(&id)
            .filter(|task| task.organization_id() == organization_id)
            .cloned())
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        let mut found = matching(&tasks, query);
        found.sort_by_key(|task| Reverse(task.created_at()));
        Ok(found)
    }

    async fn list_recently_updated(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        let mut found = matching(&tasks, query);
        found.sort_by_key(|task| Reverse(task.updated_at()));
        Ok(found)
    }

    async fn delete(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let in_organization = tasks
            .get(&id)
            .is_some_and(|task| task.organization_id() == organization_id);
        if in_organization {
            tasks.remove(&id);
        }
        Ok(in_organization)
    }
}
