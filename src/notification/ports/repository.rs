//! Repository port for the notification inbox.

use crate::identity::domain::UserId;
use crate::notification::domain::{Notification, NotificationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Notification persistence contract.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a new notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError`] when persistence fails.
    async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()>;

    /// Returns up to `limit` notifications owned by `user`, newest first.
    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>>;

    /// Marks a notification owned by `user` as read and returns it.
    ///
    /// Returns `None` when no such notification belongs to `user`.
    async fn mark_read(
        &self,
        user: UserId,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// A notification with the same identifier already exists.
    #[error("duplicate notification identifier: {0}")]
    DuplicateNotification(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
