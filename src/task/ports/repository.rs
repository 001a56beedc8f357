//! Repository port for task persistence with optimistic concurrency.

use crate::identity::domain::OrganizationId;
use crate::task::domain::{Task, TaskId, TaskQuery};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every lookup is confined to one organization; a task that exists in a
/// different organization is reported exactly like a missing one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Replaces a stored task if it is still at `task.revision()`.
    ///
    /// The check and the write are a single atomic step. On success the
    /// stored task is returned at the next revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StaleRevision`] when another writer
    /// updated the task first and [`TaskRepositoryError::NotFound`] when the
    /// task no longer exists in its organization.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier within an organization.
    ///
    /// Returns `None` when the task does not exist in that organization.
    async fn find_in_organization(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Lists tasks matching the query, newest first.
    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists tasks matching the query, most recently updated first.
    async fn list_recently_updated(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;

    /// Deletes a task within an organization.
    ///
    /// Returns `false` when no such task existed.
    async fn delete(&self, organization_id: OrganizationId, id: TaskId)
    -> TaskRepositoryResult<bool>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task changed since it was read.
    #[error("task {task_id} was modified concurrently (expected revision {expected})")]
    StaleRevision {
        /// Task identifier.
        task_id: TaskId,
        /// Revision the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
