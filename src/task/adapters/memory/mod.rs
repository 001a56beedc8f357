//! In-memory adapters for task lifecycle tests and database-less runs.

mod files;
mod task;

pub use files::InMemoryProofFileStore;
pub use task::InMemoryTaskRepository;
