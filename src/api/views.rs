//! Request bodies and camelCase response views.

use crate::identity::domain::UserId;
use crate::notification::domain::Notification;
use crate::task::domain::{
    ManagerReview, Proof, ProofContent, Step, Task, TaskId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /api/tasks` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Required title.
    #[serde(default)]
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Assignee; honoured for managers only.
    pub assigned_to: Option<Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Urgency colour name.
    pub urgency_color: Option<String>,
    /// Initial status name.
    pub status: Option<String>,
    /// Step descriptions, numbered in order.
    #[serde(default)]
    pub steps: Vec<String>,
}

/// `PUT /api/tasks/:id` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    /// New title; empty is ignored.
    pub title: Option<String>,
    /// New description; empty is ignored.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New urgency colour name.
    pub urgency_color: Option<String>,
    /// New status name.
    pub status: Option<String>,
}

/// `PATCH /api/tasks/:id/steps/:n` body.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepToggleBody {
    /// Target completion state.
    pub is_completed: bool,
}

/// `POST /api/proof/:id/text` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextProofBody {
    /// Proof text.
    #[serde(default)]
    pub text: String,
}

/// `POST /api/proof/:id/review` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewBody {
    /// `approved` or `rejected`.
    #[serde(default)]
    pub decision: String,
    /// Optional feedback.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepView {
    step_number: u32,
    description: String,
    is_completed: bool,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        Self {
            step_number: step.number().value(),
            description: step.description().to_owned(),
            is_completed: step.is_completed(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProofView {
    proof_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size: Option<u64>,
    submitted_at: DateTime<Utc>,
    submitted_by: UserId,
}

impl From<&Proof> for ProofView {
    fn from(proof: &Proof) -> Self {
        let text = match &proof.content {
            ProofContent::Text { text } => Some(text.clone()),
            ProofContent::Image(_) | ProofContent::Audio(_) => None,
        };
        let file = proof.content.file_ref();
        Self {
            proof_type: proof.content.kind().as_str(),
            text,
            file_url: file.map(|f| f.file_url.clone()),
            file_name: file.map(|f| f.file_name.clone()),
            mime_type: file.map(|f| f.mime_type.clone()),
            file_size: file.map(|f| f.file_size),
            submitted_at: proof.submitted_at,
            submitted_by: proof.submitted_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewView {
    reviewed_by: UserId,
    reviewed_at: DateTime<Utc>,
    decision: &'static str,
    comment: String,
}

impl From<&ManagerReview> for ReviewView {
    fn from(review: &ManagerReview) -> Self {
        Self {
            reviewed_by: review.reviewed_by,
            reviewed_at: review.reviewed_at,
            decision: review.decision.as_str(),
            comment: review.comment.clone(),
        }
    }
}

/// Client-facing task representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    id: TaskId,
    title: String,
    description: String,
    category: String,
    urgency_color: &'static str,
    due_date: Option<DateTime<Utc>>,
    created_by: UserId,
    assigned_to: Option<UserId>,
    steps: Vec<StepView>,
    status: &'static str,
    proof: Option<ProofView>,
    manager_review: Option<ReviewView>,
    progress: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            category: task.category().to_owned(),
            urgency_color: task.urgency().as_str(),
            due_date: task.due_date(),
            created_by: task.created_by(),
            assigned_to: task.assigned_to(),
            steps: task.steps().iter().map(StepView::from).collect(),
            status: task.status().as_str(),
            proof: task.proof().map(ProofView::from),
            manager_review: task.manager_review().map(ReviewView::from),
            progress: task.progress(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Client-facing notification representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    id: Uuid,
    #[serde(rename = "type")]
    kind: &'static str,
    title: String,
    message: String,
    task_id: Option<TaskId>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id().into_inner(),
            kind: notification.kind().as_str(),
            title: notification.title().to_owned(),
            message: notification.message().to_owned(),
            task_id: notification.task(),
            is_read: notification.is_read(),
            created_at: notification.created_at(),
        }
    }
}

/// Success envelope: `{success: true, message?, ...payload}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wraps a payload without a message.
    #[must_use]
    pub const fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    /// Wraps a payload with a human-readable message.
    #[must_use]
    pub fn with_message(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            payload,
        }
    }
}

/// Payload carrying one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    /// The task.
    pub task: TaskView,
}

impl TaskPayload {
    /// Builds the payload for a task.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            task: TaskView::from(task),
        }
    }
}

/// Payload carrying one task and its rounded progress.
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgressPayload {
    /// The task.
    pub task: TaskView,
    /// Completion percentage.
    pub progress: u8,
}

/// Payload carrying a task listing.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListPayload {
    /// Number of tasks.
    pub count: usize,
    /// The tasks.
    pub tasks: Vec<TaskView>,
}

/// Payload carrying the pending proof queue.
#[derive(Debug, Clone, Serialize)]
pub struct PendingPayload {
    /// Number of pending tasks.
    pub count: usize,
    /// Tasks awaiting verification.
    pub pending: Vec<TaskView>,
}

/// Payload confirming a deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPayload {
    /// Identifier of the deleted task.
    pub task_id: TaskId,
}

/// Payload carrying an inbox listing.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationListPayload {
    /// Number of notifications.
    pub count: usize,
    /// The notifications.
    pub notifications: Vec<NotificationView>,
}

/// Payload carrying one notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    /// The notification.
    pub notification: NotificationView,
}

/// Payload of the health route.
#[derive(Debug, Clone, Serialize)]
pub struct HealthPayload {
    /// Crate version.
    pub version: &'static str,
}

/// Converts a slice of tasks into views.
#[must_use]
pub fn task_views(tasks: &[Task]) -> Vec<TaskView> {
    tasks.iter().map(TaskView::from).collect()
}
