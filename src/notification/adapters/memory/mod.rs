//! In-memory notification adapter for tests and database-less runs.

mod repository;

pub use repository::InMemoryNotificationRepository;
