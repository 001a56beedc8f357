//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod files;
pub mod repository;

pub use files::{ProofFileStore, ProofFileStoreError};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
