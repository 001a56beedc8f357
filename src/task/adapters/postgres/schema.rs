//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records scoped to an organization.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning organization.
        organization_id -> Uuid,
        /// Task title.
        title -> Text,
        /// Task description.
        description -> Text,
        /// Task category.
        #[max_length = 100]
        category -> Varchar,
        /// Urgency colour.
        #[max_length = 10]
        urgency_color -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Creating user.
        created_by -> Uuid,
        /// Responsible user.
        assigned_to -> Nullable<Uuid>,
        /// Ordered decomposition steps.
        steps -> Jsonb,
        /// Task status.
        #[max_length = 50]
        status -> Varchar,
        /// Current proof payload.
        proof -> Nullable<Jsonb>,
        /// Latest manager review payload.
        manager_review -> Nullable<Jsonb>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
