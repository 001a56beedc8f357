//! Diesel schema for notification persistence.

diesel::table! {
    /// Per-user notification inbox.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Event kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Short title.
        title -> Text,
        /// Message body.
        message -> Text,
        /// Related task.
        task_id -> Nullable<Uuid>,
        /// Read flag.
        is_read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
