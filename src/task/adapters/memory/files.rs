//! In-memory proof file store for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProofFile, ProofUpload},
    ports::{ProofFileStore, ProofFileStoreError},
};

/// Thread-safe in-memory proof file store keyed by file URL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProofFileStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryProofFileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes for a file URL.
    #[must_use]
    pub fn contents(&self, file_url: &str) -> Option<Vec<u8>> {
        self.files
            .read()
            .ok()
            .and_then(|files| files.get(file_url).cloned())
    }

    /// Returns how many files are currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or_default()
    }

    /// Returns `true` when no files are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(err: impl std::fmt::Display) -> ProofFileStoreError {
    ProofFileStoreError::storage(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ProofFileStore for InMemoryProofFileStore {
    async fn save(&self, upload: &ProofUpload) -> Result<ProofFile, ProofFileStoreError> {
        let file_url = format!(
            "/uploads/{}.{}",
            uuid::Uuid::new_v4(),
            upload.extension()
        );
        self.files
            .write()
            .map_err(lock_error)?
            .insert(file_url.clone(), upload.bytes().to_vec());
        Ok(ProofFile {
            file_url,
            file_name: upload.file_name().to_owned(),
            mime_type: upload.mime_type().to_owned(),
            file_size: upload.size(),
        })
    }

    async fn remove(&self, file: &ProofFile) -> Result<(), ProofFileStoreError> {
        self.files
            .write()
            .map_err(lock_error)?
            .remove(&file.file_url);
        Ok(())
    }
}
