//! Storage port for uploaded proof files.

use crate::task::domain::{ProofFile, ProofUpload};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Stores accepted proof uploads and makes them addressable by URL.
#[async_trait]
pub trait ProofFileStore: Send + Sync {
    /// Persists the upload and returns its stored metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ProofFileStoreError`] when the file cannot be written.
    async fn save(&self, upload: &ProofUpload) -> Result<ProofFile, ProofFileStoreError>;

    /// Removes a previously stored file.
    ///
    /// # Errors
    ///
    /// Returns [`ProofFileStoreError`] when the file cannot be removed.
    async fn remove(&self, file: &ProofFile) -> Result<(), ProofFileStoreError>;
}

/// Errors returned by proof file stores.
#[derive(Debug, Clone, Error)]
pub enum ProofFileStoreError {
    /// The stored file URL does not belong to this store.
    #[error("unrecognised proof file url: {0}")]
    ForeignUrl(String),

    /// Storage-layer failure.
    #[error("proof file storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProofFileStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
