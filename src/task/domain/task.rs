//! Task aggregate root and its lifecycle transitions.

use super::{
    ManagerReview, Proof, ProofContent, ReviewDecision, Step, StepNumber, TaskDomainError, TaskId,
    TaskStatus, UrgencyColor, step,
};
use crate::identity::domain::{OrganizationId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Category assigned when the creator does not choose one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Creating user.
    pub created_by: UserId,
    /// Responsible user, if any.
    pub assigned_to: Option<UserId>,
    /// Title; trimmed and required.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category; [`DEFAULT_CATEGORY`] when absent.
    pub category: Option<String>,
    /// Urgency marker.
    pub urgency: UrgencyColor,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Initial status.
    pub status: TaskStatus,
    /// Initial decomposition.
    pub steps: Vec<Step>,
}

/// Partial update of the freely editable task fields.
///
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New urgency marker.
    pub urgency: Option<UrgencyColor>,
    /// New status. Not checked against the verification flow.
    pub status: Option<TaskStatus>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    organization_id: OrganizationId,
    title: String,
    description: String,
    category: String,
    urgency: UrgencyColor,
    due_date: Option<DateTime<Utc>>,
    created_by: UserId,
    assigned_to: Option<UserId>,
    steps: Vec<Step>,
    status: TaskStatus,
    proof: Option<Proof>,
    manager_review: Option<ManagerReview>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Urgency marker.
    pub urgency: UrgencyColor,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Creating user.
    pub created_by: UserId,
    /// Responsible user.
    pub assigned_to: Option<UserId>,
    /// Decomposition steps.
    pub steps: Vec<Step>,
    /// Status.
    pub status: TaskStatus,
    /// Current proof, if any.
    pub proof: Option<Proof>,
    /// Latest review, if any.
    pub manager_review: Option<ManagerReview>,
    /// Stored revision.
    pub revision: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task at revision zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank and
    /// [`TaskDomainError::DuplicateStepNumber`] when steps share a number.
    pub fn create(new_task: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        step::ensure_unique_numbers(&new_task.steps)?;
        let category = new_task
            .category
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            organization_id: new_task.organization_id,
            title: title.to_owned(),
            description: new_task.description.trim().to_owned(),
            category,
            urgency: new_task.urgency,
            due_date: new_task.due_date,
            created_by: new_task.created_by,
            assigned_to: new_task.assigned_to,
            steps: new_task.steps,
            status: new_task.status,
            proof: None,
            manager_review: None,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            organization_id: data.organization_id,
            title: data.title,
            description: data.description,
            category: data.category,
            urgency: data.urgency,
            due_date: data.due_date,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            steps: data.steps,
            status: data.status,
            proof: data.proof,
            manager_review: data.manager_review,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the urgency marker.
    #[must_use]
    pub const fn urgency(&self) -> UrgencyColor {
        self.urgency
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the responsible user, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the decomposition steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the current proof, if any.
    #[must_use]
    pub const fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    /// Returns the latest manager review, if any.
    #[must_use]
    pub const fn manager_review(&self) -> Option<&ManagerReview> {
        self.manager_review.as_ref()
    }

    /// Returns the stored revision this value was read at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns step completion as a rounded percentage.
    #[must_use]
    pub fn progress(&self) -> u8 {
        step::progress_percent(&self.steps)
    }

    /// Returns the task as stored after a successful compare-and-swap.
    #[must_use]
    pub const fn into_next_revision(mut self) -> Self {
        self.revision += 1;
        self
    }

    /// Applies a partial edit of the freely editable fields.
    ///
    /// Empty titles and descriptions are ignored.
    pub fn apply_edit(&mut self, edit: TaskEdit, clock: &impl Clock) {
        if let Some(title) = edit.title.filter(|value| !value.trim().is_empty()) {
            self.title = title.trim().to_owned();
        }
        if let Some(description) = edit.description.filter(|value| !value.trim().is_empty()) {
            self.description = description.trim().to_owned();
        }
        if let Some(due_date) = edit.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(urgency) = edit.urgency {
            self.urgency = urgency;
        }
        if let Some(status) = edit.status {
            self.status = status;
        }
        self.touch(clock);
    }

    /// Marks one step complete or incomplete. Never changes the status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::StepNotFound`] when no step has the number.
    pub fn set_step_completion(
        &mut self,
        step_number: StepNumber,
        is_completed: bool,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let task_id = self.id;
        let target = self
            .steps
            .iter_mut()
            .find(|candidate| candidate.number() == step_number)
            .ok_or(TaskDomainError::StepNotFound {
                task_id,
                step_number,
            })?;
        target.set_completed(is_completed);
        self.touch(clock);
        Ok(())
    }

    /// Checks that the task can take a new proof submission.
    ///
    /// Proof may be submitted when none exists, or when the previous proof
    /// was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProofAlreadySubmitted`] otherwise.
    pub const fn ensure_accepts_proof(&self) -> Result<(), TaskDomainError> {
        if self.proof.is_some() && !matches!(self.status, TaskStatus::Rejected) {
            return Err(TaskDomainError::ProofAlreadySubmitted(self.id));
        }
        Ok(())
    }

    /// Replaces the proof and moves the task to awaiting verification.
    ///
    /// Any previous proof and review are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProofAlreadySubmitted`] when the task does
    /// not accept proof. The task is unchanged on error.
    pub fn submit_proof(
        &mut self,
        content: ProofContent,
        submitted_by: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_accepts_proof()?;
        self.proof = Some(Proof {
            content,
            submitted_at: clock.utc(),
            submitted_by,
        });
        self.manager_review = None;
        self.status = TaskStatus::AwaitingVerification;
        self.touch(clock);
        Ok(())
    }

    /// Records a manager decision on the pending proof.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAwaitingVerification`] unless the task
    /// is awaiting verification. The task is unchanged on error.
    pub fn record_review(
        &mut self,
        reviewed_by: UserId,
        decision: ReviewDecision,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::AwaitingVerification {
            return Err(TaskDomainError::NotAwaitingVerification {
                task_id: self.id,
                status: self.status,
            });
        }
        self.manager_review = Some(ManagerReview {
            reviewed_by,
            reviewed_at: clock.utc(),
            decision,
            comment: comment.unwrap_or_default(),
        });
        self.status = match decision {
            ReviewDecision::Approved => TaskStatus::Verified,
            ReviewDecision::Rejected => TaskStatus::Rejected,
        };
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
