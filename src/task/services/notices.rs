//! Notification content for proof lifecycle events.

use crate::identity::domain::UserId;
use crate::notification::domain::{Notification, NotificationKind};
use crate::task::domain::Task;
use minijinja::{Environment, context};
use mockable::Clock;

const PROOF_SUBMITTED_TITLE: &str = "Proof submitted";
const PROOF_SUBMITTED_TO_CREATOR: &str =
    "A proof was submitted for a task and is awaiting verification.";
const PROOF_SUBMITTED_TO_ASSIGNEE: &str = "A user submitted proof for a task";
const PROOF_APPROVED_TITLE: &str = "Proof approved";
const PROOF_APPROVED_MESSAGE: &str = "Your proof was approved. Task is now Verified.";
const PROOF_REJECTED_TITLE: &str = "Proof rejected";
const PROOF_REJECTED_TEMPLATE: &str =
    "Your proof was rejected.{% if comment %} Feedback: {{ comment }}{% endif %}";

/// Tells the task creator that proof awaits verification.
pub(super) fn proof_submitted_to_creator(task: &Task, clock: &impl Clock) -> Notification {
    Notification::new(
        task.created_by(),
        NotificationKind::ProofSubmitted,
        PROOF_SUBMITTED_TITLE,
        PROOF_SUBMITTED_TO_CREATOR,
        Some(task.id()),
        clock,
    )
}

/// Tells the assignee that proof was submitted on their task.
pub(super) fn proof_submitted_to_assignee(
    task: &Task,
    assignee: UserId,
    clock: &impl Clock,
) -> Notification {
    Notification::new(
        assignee,
        NotificationKind::ProofSubmitted,
        PROOF_SUBMITTED_TITLE,
        PROOF_SUBMITTED_TO_ASSIGNEE,
        Some(task.id()),
        clock,
    )
}

/// Tells the submitter their proof was approved.
pub(super) fn proof_approved(task: &Task, submitter: UserId, clock: &impl Clock) -> Notification {
    Notification::new(
        submitter,
        NotificationKind::ProofApproved,
        PROOF_APPROVED_TITLE,
        PROOF_APPROVED_MESSAGE,
        Some(task.id()),
        clock,
    )
}

/// Tells the submitter their proof was rejected, quoting any feedback.
pub(super) fn proof_rejected(
    task: &Task,
    submitter: UserId,
    comment: &str,
    clock: &impl Clock,
) -> Result<Notification, minijinja::Error> {
    let message =
        Environment::new().render_str(PROOF_REJECTED_TEMPLATE, context! { comment => comment })?;
    Ok(Notification::new(
        submitter,
        NotificationKind::ProofRejected,
        PROOF_REJECTED_TITLE,
        message,
        Some(task.id()),
        clock,
    ))
}
