//! Service tests for proof submission, review and the notifications they emit.

use std::sync::Arc;

use crate::identity::domain::{OrganizationId, Principal, Role, UserId};
use crate::notification::{
    adapters::memory::InMemoryNotificationRepository,
    domain::{Notification, NotificationId, NotificationKind},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::{
    adapters::memory::{InMemoryProofFileStore, InMemoryTaskRepository},
    domain::{ProofContent, ProofKind, ReviewDecision, Task, TaskDomainError, TaskStatus},
    services::{
        CreateTaskRequest, FileProofRequest, ReviewProofRequest, TaskLifecycleError,
        TaskLifecycleService,
    },
};
use async_trait::async_trait;
use mockable::DefaultClock;
use mockall::mock;
use rstest::{fixture, rstest};

type TestService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryNotificationRepository,
    InMemoryProofFileStore,
    DefaultClock,
>;

struct Office {
    service: TestService,
    notifications: Arc<InMemoryNotificationRepository>,
    files: Arc<InMemoryProofFileStore>,
    manager: Principal,
    employee: Principal,
    creator: Principal,
}

#[fixture]
fn office() -> Office {
    let organization_id = OrganizationId::new();
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let files = Arc::new(InMemoryProofFileStore::new());
    Office {
        service: TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&notifications),
            Arc::clone(&files),
            Arc::new(DefaultClock),
        ),
        notifications,
        files,
        manager: Principal::new(UserId::new(), Role::Manager, Some(organization_id)),
        employee: Principal::new(UserId::new(), Role::Employee, Some(organization_id)),
        creator: Principal::new(UserId::new(), Role::Manager, Some(organization_id)),
    }
}

async fn assigned_task(office: &Office) -> Result<Task, TaskLifecycleError> {
    office
        .service
        .create_task(
            &office.creator,
            CreateTaskRequest::new("Clean the lab").with_assignee(office.employee.id()),
        )
        .await
}

fn kinds_for(notifications: &[Notification], user: UserId) -> Vec<NotificationKind> {
    notifications
        .iter()
        .filter(|notification| notification.user() == user)
        .map(Notification::kind)
        .collect()
}

fn png_request() -> FileProofRequest {
    FileProofRequest::new("after.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn text_proof_notifies_assignee_and_creator(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let submitted = office
        .service
        .submit_text_proof(&office.employee, task.id(), "All benches wiped")
        .await?;

    eyre::ensure!(submitted.status() == TaskStatus::AwaitingVerification);
    let proof = submitted.proof().ok_or_else(|| eyre::eyre!("proof missing"))?;
    eyre::ensure!(proof.submitted_by == office.employee.id());
    eyre::ensure!(proof.content.kind() == ProofKind::Text);

    let stored = office.notifications.all()?;
    eyre::ensure!(stored.len() == 2, "expected 2 notifications, got {}", stored.len());
    eyre::ensure!(kinds_for(&stored, office.employee.id()) == [NotificationKind::ProofSubmitted]);
    eyre::ensure!(kinds_for(&stored, office.creator.id()) == [NotificationKind::ProofSubmitted]);
    eyre::ensure!(stored.iter().all(|n| n.task() == Some(task.id())));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_text_proof_is_rejected(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let result = office
        .service
        .submit_text_proof(&office.employee, task.id(), "   ")
        .await;

    eyre::ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyProofText))
    ));
    eyre::ensure!(office.notifications.all()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrelated_user_cannot_submit_proof(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    let stranger = Principal::new(UserId::new(), Role::Employee, office.manager.organization_id());

    let result = office
        .service
        .submit_text_proof(&stranger, task.id(), "not mine")
        .await;

    eyre::ensure!(matches!(result, Err(TaskLifecycleError::NotAuthorized(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_proof_stores_upload_and_notifies_creator(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let submitted = office
        .service
        .submit_file_proof(&office.employee, task.id(), png_request())
        .await?;

    let proof = submitted.proof().ok_or_else(|| eyre::eyre!("proof missing"))?;
    let ProofContent::Image(file) = &proof.content else {
        eyre::bail!("expected image proof, got {:?}", proof.content);
    };
    eyre::ensure!(file.file_name == "after.png");
    eyre::ensure!(file.file_size == 4);
    eyre::ensure!(office.files.contents(&file.file_url).is_some());

    let stored = office.notifications.all()?;
    eyre::ensure!(kinds_for(&stored, office.creator.id()) == [NotificationKind::ProofSubmitted]);
    eyre::ensure!(kinds_for(&stored, office.employee.id()).is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn audio_upload_becomes_audio_proof(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let submitted = office
        .service
        .submit_file_proof(
            &office.employee,
            task.id(),
            FileProofRequest::new("memo.mp3", "audio/mpeg", vec![1; 16]),
        )
        .await?;

    eyre::ensure!(submitted.proof().map(|p| p.content.kind()) == Some(ProofKind::Audio));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_upload_leaves_task_and_store_untouched(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let result = office
        .service
        .submit_file_proof(
            &office.employee,
            task.id(),
            FileProofRequest::new("notes.pdf", "application/pdf", vec![1]),
        )
        .await;

    eyre::ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::UnsupportedProofMimeType(_)))
    ));
    eyre::ensure!(office.files.is_empty());
    let current = office.service.get_task(&office.manager, task.id()).await?;
    eyre::ensure!(current == task);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_proof_while_pending_stores_nothing(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "first")
        .await?;

    let result = office
        .service
        .submit_file_proof(&office.employee, task.id(), png_request())
        .await;

    eyre::ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::ProofAlreadySubmitted(_)))
    ));
    eyre::ensure!(office.files.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_verifies_and_notifies_submitter(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;

    let reviewed = office
        .service
        .review_proof(&office.manager, task.id(), ReviewProofRequest::new("approved"))
        .await?;

    eyre::ensure!(reviewed.status() == TaskStatus::Verified);
    let review = reviewed
        .manager_review()
        .ok_or_else(|| eyre::eyre!("review missing"))?;
    eyre::ensure!(review.decision == ReviewDecision::Approved);
    eyre::ensure!(review.reviewed_by == office.manager.id());
    eyre::ensure!(review.comment.is_empty());

    let stored = office.notifications.all()?;
    let approvals: Vec<_> = stored
        .iter()
        .filter(|n| n.kind() == NotificationKind::ProofApproved)
        .collect();
    eyre::ensure!(approvals.len() == 1);
    eyre::ensure!(approvals.iter().all(|n| n.user() == office.employee.id()));

    let again = office
        .service
        .submit_text_proof(&office.employee, task.id(), "more")
        .await;
    eyre::ensure!(matches!(
        again,
        Err(TaskLifecycleError::Domain(TaskDomainError::ProofAlreadySubmitted(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejection_quotes_feedback_and_allows_resubmission(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;

    let reviewed = office
        .service
        .review_proof(
            &office.manager,
            task.id(),
            ReviewProofRequest::new("rejected").with_comment("Photo is blurry"),
        )
        .await?;
    eyre::ensure!(reviewed.status() == TaskStatus::Rejected);

    let stored = office.notifications.all()?;
    let rejection = stored
        .iter()
        .find(|n| n.kind() == NotificationKind::ProofRejected)
        .ok_or_else(|| eyre::eyre!("rejection notification missing"))?;
    eyre::ensure!(rejection.user() == office.employee.id());
    eyre::ensure!(
        rejection.message() == "Your proof was rejected. Feedback: Photo is blurry",
        "unexpected message: {}",
        rejection.message()
    );

    let resubmitted = office
        .service
        .submit_text_proof(&office.employee, task.id(), "clearer photo")
        .await?;
    eyre::ensure!(resubmitted.status() == TaskStatus::AwaitingVerification);
    eyre::ensure!(resubmitted.manager_review().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejection_without_comment_has_plain_message(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;

    office
        .service
        .review_proof(&office.manager, task.id(), ReviewProofRequest::new("rejected"))
        .await?;

    let stored = office.notifications.all()?;
    eyre::ensure!(stored.iter().any(|n| n.kind() == NotificationKind::ProofRejected
        && n.message() == "Your proof was rejected."));
    Ok(())
}

#[rstest]
#[case("approve")]
#[case("Approved")]
#[case("")]
#[tokio::test(flavor = "multi_thread")]
async fn review_rejects_unknown_decisions(office: Office, #[case] decision: &str) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;

    let result = office
        .service
        .review_proof(&office.manager, task.id(), ReviewProofRequest::new(decision))
        .await;

    eyre::ensure!(matches!(result, Err(TaskLifecycleError::InvalidDecision(_))));
    let current = office.service.get_task(&office.manager, task.id()).await?;
    eyre::ensure!(current.status() == TaskStatus::AwaitingVerification);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_requires_manager_and_pending_proof(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;

    let not_pending = office
        .service
        .review_proof(&office.manager, task.id(), ReviewProofRequest::new("approved"))
        .await;
    eyre::ensure!(matches!(
        not_pending,
        Err(TaskLifecycleError::Domain(TaskDomainError::NotAwaitingVerification { .. }))
    ));

    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;
    let by_employee = office
        .service
        .review_proof(&office.employee, task.id(), ReviewProofRequest::new("approved"))
        .await;
    eyre::ensure!(matches!(by_employee, Err(TaskLifecycleError::ManagerRequired)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_proofs_lists_awaiting_tasks_for_managers(office: Office) -> eyre::Result<()> {
    let pending = assigned_task(&office).await?;
    let idle = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, pending.id(), "done")
        .await?;

    let listed = office.service.pending_proofs(&office.manager).await?;
    eyre::ensure!(listed.iter().map(Task::id).eq([pending.id()]));
    eyre::ensure!(listed.iter().all(|task| task.id() != idle.id()));

    let refused = office.service.pending_proofs(&office.employee).await;
    eyre::ensure!(matches!(refused, Err(TaskLifecycleError::ManagerRequired)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reviews_apply_exactly_once(office: Office) -> eyre::Result<()> {
    let task = assigned_task(&office).await?;
    office
        .service
        .submit_text_proof(&office.employee, task.id(), "done")
        .await?;

    let (approve, reject) = tokio::join!(
        office
            .service
            .review_proof(&office.manager, task.id(), ReviewProofRequest::new("approved")),
        office
            .service
            .review_proof(&office.creator, task.id(), ReviewProofRequest::new("rejected")),
    );

    let successes = [approve.is_ok(), reject.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();
    eyre::ensure!(successes == 1, "exactly one review should win");
    for outcome in [&approve, &reject] {
        if let Err(err) = outcome {
            eyre::ensure!(
                matches!(
                    err,
                    TaskLifecycleError::Domain(TaskDomainError::NotAwaitingVerification { .. })
                ),
                "loser should see a state conflict, got {err}"
            );
        }
    }

    let reviews = office
        .notifications
        .all()?
        .into_iter()
        .filter(|n| {
            matches!(
                n.kind(),
                NotificationKind::ProofApproved | NotificationKind::ProofRejected
            )
        })
        .count();
    eyre::ensure!(reviews == 1);
    Ok(())
}

mock! {
    Notifications {}

    #[async_trait]
    impl NotificationRepository for Notifications {
        async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()>;
        async fn list_for_user(
            &self,
            user: UserId,
            limit: usize,
        ) -> NotificationRepositoryResult<Vec<Notification>>;
        async fn mark_read(
            &self,
            user: UserId,
            id: NotificationId,
        ) -> NotificationRepositoryResult<Option<Notification>>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notification_failures_do_not_undo_transitions() -> eyre::Result<()> {
    let mut notifications = MockNotifications::new();
    notifications.expect_store().returning(|_| {
        Err(NotificationRepositoryError::persistence(std::io::Error::other(
            "inbox offline",
        )))
    });
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(notifications),
        Arc::new(InMemoryProofFileStore::new()),
        Arc::new(DefaultClock),
    );
    let manager = Principal::new(UserId::new(), Role::Manager, Some(OrganizationId::new()));
    let task = service
        .create_task(&manager, CreateTaskRequest::new("Fragile inbox"))
        .await?;

    let submitted = service.submit_text_proof(&manager, task.id(), "done").await?;
    eyre::ensure!(submitted.status() == TaskStatus::AwaitingVerification);

    let reviewed = service
        .review_proof(&manager, task.id(), ReviewProofRequest::new("approved"))
        .await?;
    eyre::ensure!(reviewed.status() == TaskStatus::Verified);
    Ok(())
}
