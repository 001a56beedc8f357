//! Domain model for user notifications.

mod error;
mod notification;

pub use error::ParseNotificationKindError;
pub use notification::{Notification, NotificationId, NotificationKind, PersistedNotificationData};
