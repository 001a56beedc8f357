//! In-memory notification repository.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::{Arc, RwLock};

use crate::identity::domain::UserId;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};

/// Thread-safe in-memory notification repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored notification in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn all(&self) -> NotificationRepositoryResult<Vec<Notification>> {
        Ok(self.notifications.read().map_err(lock_error)?.clone())
    }
}

fn lock_error(err: impl std::fmt::Display) -> NotificationRepositoryError {
    NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let mut notifications = self.notifications.write().map_err(lock_error)?;
        if notifications
            .iter()
            .any(|existing| existing.id() == notification.id())
        {
            return Err(NotificationRepositoryError::DuplicateNotification(
                notification.id(),
            ));
        }
        notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let notifications = self.notifications.read().map_err(lock_error)?;
        let mut owned: Vec<Notification> = notifications
            .iter()
            .rev()
            .filter(|notification| notification.user() == user)
            .cloned()
            .collect();
        owned.sort_by_key(|notification| Reverse(notification.created_at()));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn mark_read(
        &self,
        user: UserId,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        let mut notifications = self.notifications.write().map_err(lock_error)?;
        let found = notifications
            .iter_mut()
            .find(|notification| notification.id() == id && notification.user() == user)
            .map(|notification| {
                notification.mark_read();
                notification.clone()
            });
        Ok(found)
    }
}
