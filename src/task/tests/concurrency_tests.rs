//! Compare-and-swap retry behaviour of the lifecycle service under
//! interleaved writers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::ApiError;
use crate::identity::domain::{OrganizationId, Principal, Role, UserId};
use crate::notification::adapters::memory::InMemoryNotificationRepository;
use crate::task::{
    adapters::memory::{InMemoryProofFileStore, InMemoryTaskRepository},
    domain::{
        ProofContent, ProofKind, ReviewDecision, StepNumber, Task, TaskDomainError, TaskId,
        TaskQuery, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    services::{
        CreateTaskRequest, FileProofRequest, MAX_UPDATE_ATTEMPTS, ReviewProofRequest,
        TaskLifecycleError, TaskLifecycleService,
    },
};
use async_trait::async_trait;
use axum::http::StatusCode;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type RivalWrite = Box<dyn FnOnce(&mut Task) -> Result<(), TaskDomainError> + Send>;

/// Commits a rival write between the caller's read and its update.
#[derive(Default)]
struct RivalFirstRepository {
    inner: InMemoryTaskRepository,
    rival: Mutex<Option<RivalWrite>>,
    updates: AtomicUsize,
}

impl RivalFirstRepository {
    /// Runs `rival` against the stored task on the next update call.
    fn arm(&self, rival: RivalWrite) {
        *self.rival.lock().expect("rival slot lock") = Some(rival);
        self.updates.store(0, Ordering::SeqCst);
    }

    fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    async fn stored(&self, task: &Task) -> TaskRepositoryResult<Task> {
        self.inner
            .find_in_organization(task.organization_id(), task.id())
            .await?
            .ok_or(TaskRepositoryError::NotFound(task.id()))
    }
}

#[async_trait]
impl TaskRepository for RivalFirstRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let rival = self.rival.lock().expect("rival slot lock").take();
        if let Some(rival) = rival {
            let mut current = self.stored(task).await?;
            rival(&mut current).map_err(TaskRepositoryError::persistence)?;
            self.inner.update(&current).await?;
        }
        self.inner.update(task).await
    }

    async fn find_in_organization(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_in_organization(organization_id, id).await
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list(query).await
    }

    async fn list_recently_updated(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list_recently_updated(query).await
    }

    async fn delete(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        self.inner.delete(organization_id, id).await
    }
}

/// Loses every compare-and-swap.
#[derive(Default)]
struct AlwaysStaleRepository {
    inner: InMemoryTaskRepository,
    updates: AtomicUsize,
}

#[async_trait]
impl TaskRepository for AlwaysStaleRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Err(TaskRepositoryError::StaleRevision {
            task_id: task.id(),
            expected: task.revision(),
        })
    }

    async fn find_in_organization(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_in_organization(organization_id, id).await
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list(query).await
    }

    async fn list_recently_updated(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list_recently_updated(query).await
    }

    async fn delete(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        self.inner.delete(organization_id, id).await
    }
}

type Service<R> =
    TaskLifecycleService<R, InMemoryNotificationRepository, InMemoryProofFileStore, DefaultClock>;

struct Race<R: TaskRepository> {
    repository: Arc<R>,
    files: Arc<InMemoryProofFileStore>,
    service: Service<R>,
    manager: Principal,
    rival_manager: Principal,
    employee: Principal,
}

fn race<R: TaskRepository + Default>() -> Race<R> {
    let organization_id = Some(OrganizationId::new());
    let repository = Arc::new(R::default());
    let files = Arc::new(InMemoryProofFileStore::new());
    Race {
        service: TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::clone(&files),
            Arc::new(DefaultClock),
        ),
        repository,
        files,
        manager: Principal::new(UserId::new(), Role::Manager, organization_id),
        rival_manager: Principal::new(UserId::new(), Role::Manager, organization_id),
        employee: Principal::new(UserId::new(), Role::Employee, organization_id),
    }
}

#[fixture]
fn rival_race() -> Race<RivalFirstRepository> {
    race()
}

async fn assigned_task<R: TaskRepository>(race: &Race<R>) -> Result<Task, TaskLifecycleError> {
    race.service
        .create_task(
            &race.manager,
            CreateTaskRequest::new("Inspect ladder")
                .with_assignee(race.employee.id())
                .with_steps(vec!["rungs".to_owned(), "feet".to_owned()]),
        )
        .await
}

async fn pending_task<R: TaskRepository>(race: &Race<R>) -> Result<Task, TaskLifecycleError> {
    let task = assigned_task(race).await?;
    race.service
        .submit_text_proof(&race.employee, task.id(), "inspected")
        .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_losing_to_a_rival_review_sees_state_conflict(
    rival_race: Race<RivalFirstRepository>,
) -> eyre::Result<()> {
    let task = pending_task(&rival_race).await?;
    let rival = rival_race.rival_manager.id();
    rival_race.repository.arm(Box::new(move |current: &mut Task| {
        current.record_review(rival, ReviewDecision::Approved, None, &DefaultClock)
    }));

    let result = rival_race
        .service
        .review_proof(
            &rival_race.manager,
            task.id(),
            ReviewProofRequest::new("rejected").with_comment("blurry"),
        )
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::NotAwaitingVerification {
                status: TaskStatus::Verified,
                ..
            }))
        ),
        "loser should see the rival's verified state, got {result:?}"
    );
    eyre::ensure!(rival_race.repository.updates() == 1, "loser must not write again");
    let stored = rival_race.repository.stored(&task).await?;
    eyre::ensure!(stored.status() == TaskStatus::Verified);
    let review = stored
        .manager_review()
        .ok_or_else(|| eyre::eyre!("rival review should be stored"))?;
    eyre::ensure!(review.reviewed_by == rival && review.decision == ReviewDecision::Approved);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn text_proof_losing_to_a_rival_submission_sees_already_submitted(
    rival_race: Race<RivalFirstRepository>,
) -> eyre::Result<()> {
    let task = assigned_task(&rival_race).await?;
    let rival = rival_race.manager.id();
    rival_race.repository.arm(Box::new(move |current: &mut Task| {
        current.submit_proof(ProofContent::text("rival proof")?, rival, &DefaultClock)
    }));

    let result = rival_race
        .service
        .submit_text_proof(&rival_race.employee, task.id(), "late proof")
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::ProofAlreadySubmitted(_)))
        ),
        "loser should see the rival's proof, got {result:?}"
    );
    let stored = rival_race.repository.stored(&task).await?;
    let proof = stored
        .proof()
        .ok_or_else(|| eyre::eyre!("rival proof should be stored"))?;
    eyre::ensure!(proof.submitted_by == rival);
    eyre::ensure!(proof.content == ProofContent::text("rival proof")?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_proof_losing_a_race_removes_its_upload(
    rival_race: Race<RivalFirstRepository>,
) -> eyre::Result<()> {
    let task = assigned_task(&rival_race).await?;
    let rival = rival_race.manager.id();
    rival_race.repository.arm(Box::new(move |current: &mut Task| {
        current.submit_proof(ProofContent::text("rival proof")?, rival, &DefaultClock)
    }));

    let result = rival_race
        .service
        .submit_file_proof(
            &rival_race.employee,
            task.id(),
            FileProofRequest::new("ladder.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]),
        )
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::ProofAlreadySubmitted(_)))
        ),
        "loser should see the rival's proof, got {result:?}"
    );
    eyre::ensure!(rival_race.files.is_empty(), "losing upload should be removed");
    let stored = rival_race.repository.stored(&task).await?;
    eyre::ensure!(stored.proof().map(|proof| proof.content.kind()) == Some(ProofKind::Text));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrelated_rival_write_is_retried_on_fresh_state(
    rival_race: Race<RivalFirstRepository>,
) -> eyre::Result<()> {
    let task = pending_task(&rival_race).await?;
    let first_step = StepNumber::new(1)?;
    rival_race.repository.arm(Box::new(move |current: &mut Task| {
        current.set_step_completion(first_step, true, &DefaultClock)
    }));

    let reviewed = rival_race
        .service
        .review_proof(&rival_race.manager, task.id(), ReviewProofRequest::new("approved"))
        .await?;

    eyre::ensure!(rival_race.repository.updates() == 2, "expected one retry");
    eyre::ensure!(reviewed.status() == TaskStatus::Verified);
    eyre::ensure!(reviewed.progress() == 50, "rival step toggle must survive the retry");
    eyre::ensure!(reviewed.revision() == task.revision() + 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistent_conflicts_end_in_contention() -> eyre::Result<()> {
    let stale_race = race::<AlwaysStaleRepository>();
    let task = assigned_task(&stale_race).await?;

    let result = stale_race
        .service
        .submit_text_proof(&stale_race.employee, task.id(), "inspected")
        .await;

    let Err(err) = result else {
        eyre::bail!("expected contention, got {result:?}");
    };
    eyre::ensure!(
        matches!(err, TaskLifecycleError::Contention(id) if id == task.id()),
        "expected Contention, got {err:?}"
    );
    eyre::ensure!(
        stale_race.repository.updates.load(Ordering::SeqCst) == MAX_UPDATE_ATTEMPTS,
        "every attempt should reach the repository"
    );
    eyre::ensure!(ApiError::from(err).status() == StatusCode::CONFLICT);

    let stored = stale_race
        .repository
        .find_in_organization(task.organization_id(), task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    eyre::ensure!(stored == task, "no attempt may be persisted");
    Ok(())
}
