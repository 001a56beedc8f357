//! Service layer for task creation, editing and the proof/review flow.

use super::notices;
use crate::identity::domain::{OrganizationId, Principal, UserId};
use crate::notification::{domain::Notification, ports::NotificationRepository};
use crate::task::{
    domain::{
        NewTask, ParseReviewDecisionError, ParseTaskStatusError, ParseUrgencyColorError,
        ProofContent, ProofUpload, ReviewDecision, StepNumber, Task, TaskDomainError, TaskEdit,
        TaskId, TaskQuery, TaskScope, TaskStatus, UrgencyColor, can_access_task, number_steps,
    },
    ports::{ProofFileStore, ProofFileStoreError, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Attempts made for a read-modify-write before reporting contention.
pub const MAX_UPDATE_ATTEMPTS: usize = 5;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    category: Option<String>,
    assigned_to: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
    urgency: Option<String>,
    status: Option<String>,
    steps: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            category: None,
            assigned_to: None,
            due_date: None,
            urgency: None,
            status: None,
            steps: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the assignee. Only honoured for managers.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the urgency colour by name.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Sets the initial status by name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the step descriptions, numbered from one in order.
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = String>) -> Self {
        self.steps = steps.into_iter().collect();
        self
    }
}

/// Request payload for a partial task edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    urgency: Option<String>,
    status: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets a new urgency colour by name.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Sets a new status by name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Request payload for file proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProofRequest {
    /// Uploader-supplied file name.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl FileProofRequest {
    /// Creates a file proof request.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Request payload for a manager's review decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewProofRequest {
    decision: String,
    comment: Option<String>,
}

impl ReviewProofRequest {
    /// Creates a review request with a decision name.
    #[must_use]
    pub fn new(decision: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            comment: None,
        }
    }

    /// Sets reviewer feedback.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or a lifecycle precondition failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Proof file storage failed.
    #[error(transparent)]
    Files(#[from] ProofFileStoreError),
    /// The supplied status name is unknown.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// The supplied urgency colour is unknown.
    #[error(transparent)]
    InvalidUrgency(#[from] ParseUrgencyColorError),
    /// The supplied review decision is unknown.
    #[error(transparent)]
    InvalidDecision(#[from] ParseReviewDecisionError),
    /// The caller has not joined an organization.
    #[error("Not part of an organization")]
    NoOrganization,
    /// The operation is reserved for managers.
    #[error("Manager role required")]
    ManagerRequired,
    /// The caller is neither creator, assignee nor manager of the task.
    #[error("Not authorized for this task")]
    NotAuthorized(TaskId),
    /// No visible task exists with the given identifier.
    #[error("Task not found")]
    NotFound(TaskId),
    /// Concurrent writers kept winning the compare-and-swap.
    #[error("task {0} is being modified concurrently, retry later")]
    Contention(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, N, F, C>
where
    R: TaskRepository,
    N: NotificationRepository,
    F: ProofFileStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifications: Arc<N>,
    files: Arc<F>,
    clock: Arc<C>,
}

impl<R, N, F, C> Clone for TaskLifecycleService<R, N, F, C>
where
    R: TaskRepository,
    N: NotificationRepository,
    F: ProofFileStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifications: Arc::clone(&self.notifications),
            files: Arc::clone(&self.files),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, N, F, C> TaskLifecycleService<R, N, F, C>
where
    R: TaskRepository,
    N: NotificationRepository,
    F: ProofFileStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifications: Arc<N>, files: Arc<F>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifications,
            files,
            clock,
        }
    }

    /// Creates a task in the caller's organization.
    ///
    /// Non-managers always become the assignee of tasks they create.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NoOrganization`] when the caller has no
    /// organization, validation errors for bad input, or repository errors.
    pub async fn create_task(
        &self,
        principal: &Principal,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let urgency = request
            .urgency
            .as_deref()
            .map(UrgencyColor::try_from)
            .transpose()?
            .unwrap_or(UrgencyColor::Yellow);
        let status = request
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?
            .unwrap_or_default();
        let assigned_to = if principal.is_manager() {
            request.assigned_to
        } else {
            Some(principal.id())
        };

        let task = Task::create(
            NewTask {
                organization_id,
                created_by: principal.id(),
                assigned_to,
                title: request.title,
                description: request.description.unwrap_or_default(),
                category: request.category,
                urgency,
                due_date: request.due_date,
                status,
                steps: number_steps(request.steps)?,
            },
            &*self.clock,
        )?;
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), created_by = %principal.id(), "task created");
        Ok(task)
    }

    /// Lists the tasks visible to the caller, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NoOrganization`] or repository errors.
    pub async fn list_tasks(&self, principal: &Principal) -> TaskLifecycleResult<Vec<Task>> {
        let organization_id = require_organization(principal)?;
        let query = TaskQuery::visible_to(principal, organization_id);
        Ok(self.repository.list(&query).await?)
    }

    /// Returns one task visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// lives in another organization, or is outside the caller's scope.
    pub async fn get_task(
        &self,
        principal: &Principal,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let task = self.load(organization_id, task_id).await?;
        ensure_in_scope(principal, &task)?;
        Ok(task)
    }

    /// Marks one step complete or incomplete.
    ///
    /// Step completion never changes the task status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for invisible tasks and
    /// [`TaskDomainError::StepNotFound`] for unknown step numbers.
    pub async fn set_step_completion(
        &self,
        principal: &Principal,
        task_id: TaskId,
        step_number: u32,
        is_completed: bool,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let number = StepNumber::new(step_number)?;
        let clock = &*self.clock;
        self.mutate(organization_id, task_id, |task| {
            ensure_in_scope(principal, task)?;
            Ok(task.set_step_completion(number, is_completed, clock)?)
        })
        .await
    }

    /// Applies a partial edit to the freely editable fields.
    ///
    /// A status supplied here is applied as-is, including verification
    /// states; such moves are logged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for invisible tasks and parse
    /// errors for unknown status or urgency names.
    pub async fn update_task(
        &self,
        principal: &Principal,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let edit = TaskEdit {
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            urgency: request.urgency.as_deref().map(UrgencyColor::try_from).transpose()?,
            status: request.status.as_deref().map(TaskStatus::try_from).transpose()?,
        };
        let clock = &*self.clock;
        let mut previous_status = TaskStatus::default();
        let updated = self
            .mutate(organization_id, task_id, |task| {
                ensure_in_scope(principal, task)?;
                previous_status = task.status();
                task.apply_edit(edit.clone(), clock);
                Ok(())
            })
            .await?;

        let next_status = updated.status();
        if previous_status != next_status
            && (previous_status.is_verification_state() || next_status.is_verification_state())
        {
            warn!(
                task_id = %task_id,
                editor = %principal.id(),
                from = %previous_status,
                to = %next_status,
                "task status moved outside the verification flow"
            );
        }
        Ok(updated)
    }

    /// Permanently deletes a task. Managers only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ManagerRequired`] for other roles and
    /// [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn delete_task(&self, principal: &Principal, task_id: TaskId) -> TaskLifecycleResult<()> {
        let organization_id = require_organization(principal)?;
        ensure_manager(principal)?;
        if !self.repository.delete(organization_id, task_id).await? {
            return Err(TaskLifecycleError::NotFound(task_id));
        }
        info!(task_id = %task_id, deleted_by = %principal.id(), "task deleted");
        Ok(())
    }

    /// Submits text proof and moves the task to awaiting verification.
    ///
    /// Notifies the assignee (if any) and the creator.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProofText`] for blank text,
    /// [`TaskLifecycleError::NotAuthorized`] when the caller may not access
    /// the task and [`TaskDomainError::ProofAlreadySubmitted`] when proof is
    /// pending or approved.
    pub async fn submit_text_proof(
        &self,
        principal: &Principal,
        task_id: TaskId,
        text: impl Into<String>,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let content = ProofContent::text(text)?;
        let task = self
            .apply_proof(principal, organization_id, task_id, content)
            .await?;

        if let Some(assignee) = task.assigned_to() {
            self.emit(notices::proof_submitted_to_assignee(&task, assignee, &*self.clock))
                .await;
        }
        self.emit(notices::proof_submitted_to_creator(&task, &*self.clock))
            .await;
        Ok(task)
    }

    /// Stores an uploaded file and submits it as proof.
    ///
    /// The proof kind is derived from the MIME type. The upload is validated
    /// before the task is touched, and the stored file is removed again if
    /// the transition fails. Notifies the creator.
    ///
    /// # Errors
    ///
    /// Returns upload validation errors, [`TaskLifecycleError::NotAuthorized`],
    /// [`TaskDomainError::ProofAlreadySubmitted`], or storage errors.
    pub async fn submit_file_proof(
        &self,
        principal: &Principal,
        task_id: TaskId,
        request: FileProofRequest,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let upload = ProofUpload::new(request.file_name, request.mime_type, request.bytes)?;
        self.ensure_proof_accepted(principal, task_id).await?;

        let stored = self.files.save(&upload).await?;
        let content = ProofContent::file(stored.clone());
        let task = match self
            .apply_proof(principal, organization_id, task_id, content)
            .await
        {
            Ok(task) => task,
            Err(err) => {
                if let Err(cleanup) = self.files.remove(&stored).await {
                    warn!(
                        task_id = %task_id,
                        file_url = %stored.file_url,
                        error = %cleanup,
                        "failed to remove proof file after rejected submission"
                    );
                }
                return Err(err);
            }
        };

        self.emit(notices::proof_submitted_to_creator(&task, &*self.clock))
            .await;
        Ok(task)
    }

    /// Checks that the caller may submit proof for the task right now and
    /// returns the task as currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is not in the
    /// caller's organization, [`TaskLifecycleError::NotAuthorized`] when the
    /// caller may not access it and [`TaskDomainError::ProofAlreadySubmitted`]
    /// when proof is pending or approved.
    pub async fn ensure_proof_accepted(
        &self,
        principal: &Principal,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        let current = self.load(organization_id, task_id).await?;
        ensure_can_access(principal, &current)?;
        current.ensure_accepts_proof()?;
        Ok(current)
    }

    /// Lists tasks awaiting verification in the caller's organization, most
    /// recently updated first. Managers only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ManagerRequired`] for other roles.
    pub async fn pending_proofs(&self, principal: &Principal) -> TaskLifecycleResult<Vec<Task>> {
        let organization_id = require_organization(principal)?;
        ensure_manager(principal)?;
        let query = TaskQuery::with_status(organization_id, TaskStatus::AwaitingVerification);
        Ok(self.repository.list_recently_updated(&query).await?)
    }

    /// Records a manager's decision on pending proof.
    ///
    /// Approval verifies the task; rejection reopens it for resubmission.
    /// The proof submitter is notified either way.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ManagerRequired`] for other roles,
    /// [`TaskLifecycleError::InvalidDecision`] for unknown decisions and
    /// [`TaskDomainError::NotAwaitingVerification`] when no proof is pending.
    pub async fn review_proof(
        &self,
        principal: &Principal,
        task_id: TaskId,
        request: ReviewProofRequest,
    ) -> TaskLifecycleResult<Task> {
        let organization_id = require_organization(principal)?;
        ensure_manager(principal)?;
        let decision = ReviewDecision::try_from(request.decision.as_str())?;
        let comment = request.comment.filter(|value| !value.trim().is_empty());
        let clock = &*self.clock;

        let task = self
            .mutate(organization_id, task_id, |task| {
                Ok(task.record_review(principal.id(), decision, comment.clone(), clock)?)
            })
            .await?;
        info!(
            task_id = %task_id,
            reviewed_by = %principal.id(),
            decision = %decision,
            "proof reviewed"
        );

        if let Some(submitter) = task.proof().map(|proof| proof.submitted_by) {
            match decision {
                ReviewDecision::Approved => {
                    self.emit(notices::proof_approved(&task, submitter, clock)).await;
                }
                ReviewDecision::Rejected => {
                    let feedback = comment.as_deref().unwrap_or_default();
                    match notices::proof_rejected(&task, submitter, feedback, clock) {
                        Ok(notification) => self.emit(notification).await,
                        Err(err) => warn!(
                            task_id = %task_id,
                            error = %err,
                            "failed to render proof rejection notification"
                        ),
                    }
                }
            }
        }
        Ok(task)
    }

    async fn apply_proof(
        &self,
        principal: &Principal,
        organization_id: OrganizationId,
        task_id: TaskId,
        content: ProofContent,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let task = self
            .mutate(organization_id, task_id, |task| {
                ensure_can_access(principal, task)?;
                Ok(task.submit_proof(content.clone(), principal.id(), clock)?)
            })
            .await?;
        info!(
            task_id = %task_id,
            submitted_by = %principal.id(),
            proof_type = %content.kind(),
            "proof submitted"
        );
        Ok(task)
    }

    async fn load(&self, organization_id: OrganizationId, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_in_organization(organization_id, task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Runs `apply` against the latest stored task and writes the result
    /// with a compare-and-swap, re-reading and re-applying on conflict.
    ///
    /// Preconditions checked inside `apply` are therefore always evaluated
    /// against the state the write is based on.
    async fn mutate<A>(
        &self,
        organization_id: OrganizationId,
        task_id: TaskId,
        mut apply: A,
    ) -> TaskLifecycleResult<Task>
    where
        A: FnMut(&mut Task) -> TaskLifecycleResult<()> + Send,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut task = self.load(organization_id, task_id).await?;
            apply(&mut task)?;
            match self.repository.update(&task).await {
                Ok(stored) => return Ok(stored),
                Err(TaskRepositoryError::StaleRevision { expected, .. }) => {
                    debug!(task_id = %task_id, attempt, expected, "stale task revision, retrying");
                }
                Err(TaskRepositoryError::NotFound(_)) => {
                    return Err(TaskLifecycleError::NotFound(task_id));
                }
                Err(err) => return Err(err.into()),
            }
        }
        warn!(task_id = %task_id, "giving up after repeated concurrent modification");
        Err(TaskLifecycleError::Contention(task_id))
    }

    /// Stores a notification. Failures are logged and never undo the task
    /// change that triggered them.
    async fn emit(&self, notification: Notification) {
        if let Err(err) = self.notifications.store(&notification).await {
            warn!(
                user = %notification.user(),
                kind = %notification.kind(),
                error = %err,
                "failed to store notification"
            );
        }
    }
}

fn require_organization(principal: &Principal) -> TaskLifecycleResult<OrganizationId> {
    principal
        .organization_id()
        .ok_or(TaskLifecycleError::NoOrganization)
}

const fn ensure_manager(principal: &Principal) -> TaskLifecycleResult<()> {
    if principal.is_manager() {
        Ok(())
    } else {
        Err(TaskLifecycleError::ManagerRequired)
    }
}

fn ensure_in_scope(principal: &Principal, task: &Task) -> TaskLifecycleResult<()> {
    if TaskScope::for_principal(principal).permits(task) {
        Ok(())
    } else {
        Err(TaskLifecycleError::NotFound(task.id()))
    }
}

fn ensure_can_access(principal: &Principal, task: &Task) -> TaskLifecycleResult<()> {
    if can_access_task(principal, task) {
        Ok(())
    } else {
        Err(TaskLifecycleError::NotAuthorized(task.id()))
    }
}
