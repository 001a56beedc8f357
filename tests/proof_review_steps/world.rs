//! Shared world state for proof review BDD scenarios.

use std::sync::Arc;

use equitask::identity::domain::{OrganizationId, Principal, Role, UserId};
use equitask::notification::adapters::memory::InMemoryNotificationRepository;
use equitask::task::{
    adapters::memory::{InMemoryProofFileStore, InMemoryTaskRepository},
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryNotificationRepository,
    InMemoryProofFileStore,
    DefaultClock,
>;

/// Scenario world for proof review behaviour tests.
pub struct ProofReviewWorld {
    pub service: TestTaskService,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub creator: Principal,
    pub manager: Principal,
    pub second_manager: Principal,
    pub employee: Principal,
    pub task: Option<Task>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
    pub review_outcomes: Vec<Result<Task, TaskLifecycleError>>,
}

impl ProofReviewWorld {
    /// Creates a world with one organization and its cast of users.
    #[must_use]
    pub fn new() -> Self {
        let organization_id = Some(OrganizationId::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&notifications),
            Arc::new(InMemoryProofFileStore::new()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            notifications,
            creator: Principal::new(UserId::new(), Role::Manager, organization_id),
            manager: Principal::new(UserId::new(), Role::Manager, organization_id),
            second_manager: Principal::new(UserId::new(), Role::Manager, organization_id),
            employee: Principal::new(UserId::new(), Role::Employee, organization_id),
            task: None,
            last_result: None,
            review_outcomes: Vec::new(),
        }
    }

    /// Returns the task under test.
    ///
    /// # Errors
    ///
    /// Fails when no task has been created yet.
    pub fn task(&self) -> eyre::Result<&Task> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Records an operation result, keeping the task current on success.
    pub fn record(&mut self, result: Result<Task, TaskLifecycleError>) {
        if let Ok(ref updated) = result {
            self.task = Some(updated.clone());
        }
        self.last_result = Some(result);
    }
}

impl Default for ProofReviewWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ProofReviewWorld {
    ProofReviewWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
