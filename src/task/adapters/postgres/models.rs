//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Urgency colour.
    pub urgency_color: String,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Responsible user.
    pub assigned_to: Option<uuid::Uuid>,
    /// Steps JSON payload.
    pub steps: Value,
    /// Status.
    pub status: String,
    /// Proof JSON payload.
    pub proof: Option<Value>,
    /// Review JSON payload.
    pub manager_review: Option<Value>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Urgency colour.
    pub urgency_color: String,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Responsible user.
    pub assigned_to: Option<uuid::Uuid>,
    /// Steps JSON payload.
    pub steps: Value,
    /// Status.
    pub status: String,
    /// Proof JSON payload.
    pub proof: Option<Value>,
    /// Review JSON payload.
    pub manager_review: Option<Value>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by a compare-and-swap update.
///
/// Nullable columns are written explicitly so clearing a proof or review
/// reaches the database.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Urgency colour.
    pub urgency_color: String,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Responsible user.
    pub assigned_to: Option<uuid::Uuid>,
    /// Steps JSON payload.
    pub steps: Value,
    /// Status.
    pub status: String,
    /// Proof JSON payload.
    pub proof: Option<Value>,
    /// Review JSON payload.
    pub manager_review: Option<Value>,
    /// Next revision.
    pub revision: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
