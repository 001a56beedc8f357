//! Application services for the notification inbox.

mod inbox;

pub use inbox::{
    INBOX_LIMIT, NotificationService, NotificationServiceError, NotificationServiceResult,
};
