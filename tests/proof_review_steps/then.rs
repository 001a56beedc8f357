//! Then steps for proof review BDD scenarios.

use super::world::{ProofReviewWorld, run_async};
use equitask::identity::domain::UserId;
use equitask::notification::{
    domain::{Notification, NotificationKind},
    ports::NotificationRepository,
};
use equitask::task::{
    domain::{TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

fn inbox(world: &ProofReviewWorld, user: UserId) -> Result<Vec<Notification>, eyre::Report> {
    Ok(run_async(world.notifications.list_for_user(user, 50))?)
}

fn ensure_has_kind(
    world: &ProofReviewWorld,
    user: UserId,
    kind: &str,
) -> Result<(), eyre::Report> {
    let expected = NotificationKind::try_from(kind)
        .map_err(|err| eyre::eyre!("invalid notification kind in scenario: {err}"))?;
    let notifications = inbox(world, user)?;
    if !notifications.iter().any(|n| n.kind() == expected) {
        return Err(eyre::eyre!(
            "expected a {kind} notification for {user}, found {:?}",
            notifications.iter().map(Notification::kind).collect::<Vec<_>>()
        ));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &ProofReviewWorld, status: String) -> Result<(), eyre::Report> {
    if let Some(Err(err)) = world.last_result.as_ref() {
        return Err(eyre::eyre!("last operation failed: {err}"));
    }
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the task creator has a "{kind}" notification"#)]
fn creator_has_notification(world: &ProofReviewWorld, kind: String) -> Result<(), eyre::Report> {
    ensure_has_kind(world, world.creator.id(), &kind)
}

#[then(r#"the employee has a "{kind}" notification"#)]
fn employee_has_notification(world: &ProofReviewWorld, kind: String) -> Result<(), eyre::Report> {
    ensure_has_kind(world, world.employee.id(), &kind)
}

#[then(r#"the employee's latest notification mentions "{text}""#)]
fn latest_notification_mentions(
    world: &ProofReviewWorld,
    text: String,
) -> Result<(), eyre::Report> {
    let notifications = inbox(world, world.employee.id())?;
    let latest = notifications
        .first()
        .ok_or_else(|| eyre::eyre!("employee has no notifications"))?;
    if !latest.message().contains(&text) {
        return Err(eyre::eyre!(
            "expected latest message to mention {text:?}, got {:?}",
            latest.message()
        ));
    }
    Ok(())
}

#[then("the task has no manager review")]
fn task_has_no_review(world: &ProofReviewWorld) -> Result<(), eyre::Report> {
    if let Some(review) = world.task()?.manager_review() {
        return Err(eyre::eyre!("expected no manager review, found {review:?}"));
    }
    Ok(())
}

#[then(r#"the proof type is "{proof_type}""#)]
fn proof_type_is(world: &ProofReviewWorld, proof_type: String) -> Result<(), eyre::Report> {
    let proof = world
        .task()?
        .proof()
        .ok_or_else(|| eyre::eyre!("task has no proof"))?;
    let actual = proof.content.kind().as_str();
    if actual != proof_type {
        return Err(eyre::eyre!("expected {proof_type} proof, found {actual}"));
    }
    Ok(())
}

#[then("exactly one review succeeds")]
fn exactly_one_review_succeeds(world: &ProofReviewWorld) -> Result<(), eyre::Report> {
    let successes = world
        .review_outcomes
        .iter()
        .filter(|outcome| outcome.is_ok())
        .count();
    if successes != 1 {
        return Err(eyre::eyre!("expected one successful review, got {successes}"));
    }
    Ok(())
}

#[then("the other review fails with a state conflict")]
fn other_review_conflicts(world: &ProofReviewWorld) -> Result<(), eyre::Report> {
    let failure = world
        .review_outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .ok_or_else(|| eyre::eyre!("expected one failed review"))?;
    if !matches!(
        failure,
        TaskLifecycleError::Domain(TaskDomainError::NotAwaitingVerification { .. })
    ) {
        return Err(eyre::eyre!(
            "expected NotAwaitingVerification error, got {failure:?}"
        ));
    }
    Ok(())
}
