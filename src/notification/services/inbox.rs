//! Service layer for reading and acknowledging notifications.

use crate::identity::domain::Principal;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of notifications returned by an inbox listing.
pub const INBOX_LIMIT: usize = 50;

/// Service-level errors for notification operations.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),
    /// The caller owns no notification with the given identifier.
    #[error("Notification not found")]
    NotFound(NotificationId),
}

/// Result type for notification service operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Inbox service bound to the caller's own notifications.
pub struct NotificationService<N>
where
    N: NotificationRepository,
{
    repository: Arc<N>,
}

impl<N> Clone for NotificationService<N>
where
    N: NotificationRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<N> NotificationService<N>
where
    N: NotificationRepository,
{
    /// Creates a new notification service.
    #[must_use]
    pub const fn new(repository: Arc<N>) -> Self {
        Self { repository }
    }

    /// Lists the caller's most recent notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when lookup fails.
    pub async fn inbox(&self, principal: &Principal) -> NotificationServiceResult<Vec<Notification>> {
        Ok(self
            .repository
            .list_for_user(principal.id(), INBOX_LIMIT)
            .await?)
    }

    /// Marks one of the caller's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] when the notification
    /// does not exist or belongs to another user.
    pub async fn mark_read(
        &self,
        principal: &Principal,
        id: NotificationId,
    ) -> NotificationServiceResult<Notification> {
        self.repository
            .mark_read(principal.id(), id)
            .await?
            .ok_or(NotificationServiceError::NotFound(id))
    }
}
