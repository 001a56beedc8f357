//! Shared router state and the storage backends it can be built over.

use crate::identity::{adapters::jwt::JwtPrincipalResolver, ports::PrincipalResolver};
use crate::notification::{
    adapters::{memory::InMemoryNotificationRepository, postgres::PostgresNotificationRepository},
    ports::NotificationRepository,
    services::NotificationService,
};
use crate::task::{
    adapters::{
        files::LocalProofFileStore,
        memory::InMemoryTaskRepository,
        postgres::{PostgresTaskRepository, TaskPgPool},
    },
    ports::{ProofFileStore, TaskRepository},
    services::TaskLifecycleService,
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Set of adapters the HTTP layer is wired against.
pub trait Backend: Send + Sync + 'static {
    /// Task persistence.
    type Tasks: TaskRepository + 'static;
    /// Notification persistence.
    type Notifications: NotificationRepository + 'static;
    /// Proof file storage.
    type Files: ProofFileStore + 'static;
    /// Time source.
    type Clock: Clock + Send + Sync + 'static;
}

/// `PostgreSQL` stores with uploads on the local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    type Tasks = PostgresTaskRepository;
    type Notifications = PostgresNotificationRepository;
    type Files = LocalProofFileStore;
    type Clock = DefaultClock;
}

/// Process-local stores with uploads on the local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct InMemoryBackend;

impl Backend for InMemoryBackend {
    type Tasks = InMemoryTaskRepository;
    type Notifications = InMemoryNotificationRepository;
    type Files = LocalProofFileStore;
    type Clock = DefaultClock;
}

/// Task service specialised to a backend.
pub type BackendTaskService<B> = TaskLifecycleService<
    <B as Backend>::Tasks,
    <B as Backend>::Notifications,
    <B as Backend>::Files,
    <B as Backend>::Clock,
>;

/// Notification service specialised to a backend.
pub type BackendNotificationService<B> = NotificationService<<B as Backend>::Notifications>;

/// State shared by every request handler.
pub struct AppState<B: Backend> {
    tasks: BackendTaskService<B>,
    notifications: BackendNotificationService<B>,
    resolver: Arc<dyn PrincipalResolver>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            notifications: self.notifications.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Wires the services over explicit adapter instances.
    #[must_use]
    pub fn new(
        tasks: Arc<B::Tasks>,
        notifications: Arc<B::Notifications>,
        files: Arc<B::Files>,
        clock: Arc<B::Clock>,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            tasks: TaskLifecycleService::new(tasks, Arc::clone(&notifications), files, clock),
            notifications: NotificationService::new(notifications),
            resolver,
        }
    }

    /// Returns the task lifecycle service.
    #[must_use]
    pub const fn tasks(&self) -> &BackendTaskService<B> {
        &self.tasks
    }

    /// Returns the notification inbox service.
    #[must_use]
    pub const fn notifications(&self) -> &BackendNotificationService<B> {
        &self.notifications
    }

    /// Returns the bearer token resolver.
    #[must_use]
    pub fn resolver(&self) -> &dyn PrincipalResolver {
        self.resolver.as_ref()
    }
}

impl AppState<PostgresBackend> {
    /// Builds state over a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: TaskPgPool, files: LocalProofFileStore, jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(PostgresTaskRepository::new(pool.clone())),
            Arc::new(PostgresNotificationRepository::new(pool)),
            Arc::new(files),
            Arc::new(DefaultClock),
            Arc::new(JwtPrincipalResolver::new(jwt_secret)),
        )
    }
}

impl AppState<InMemoryBackend> {
    /// Builds state over process-local stores.
    #[must_use]
    pub fn in_memory(files: LocalProofFileStore, jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(files),
            Arc::new(DefaultClock),
            Arc::new(JwtPrincipalResolver::new(jwt_secret)),
        )
    }
}
