//! Proof file store rooted in a single upload directory.
//!
//! All file access goes through a capability handle on the upload directory,
//! so stored names can never escape it.

use crate::task::{
    domain::{ProofFile, ProofUpload},
    ports::{ProofFileStore, ProofFileStoreError},
};
use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{Clock, DefaultClock};
use std::fmt;
use std::sync::Arc;

/// URL prefix under which stored proof files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Local-directory proof file store.
///
/// Stored names are stamped with the injected clock.
pub struct LocalProofFileStore<C = DefaultClock> {
    dir: Arc<Dir>,
    clock: Arc<C>,
}

impl<C> Clone for LocalProofFileStore<C> {
    fn clone(&self) -> Self {
        Self {
            dir: Arc::clone(&self.dir),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for LocalProofFileStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalProofFileStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl<C> LocalProofFileStore<C>
where
    C: Clock + 'static,
{
    /// Opens (creating if needed) the upload directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProofFileStoreError::Storage`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &str, clock: Arc<C>) -> Result<Self, ProofFileStoreError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(ProofFileStoreError::storage)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(ProofFileStoreError::storage)?;
        Ok(Self {
            dir: Arc::new(dir),
            clock,
        })
    }

    /// Builds a collision-resistant stored name: `<unix-millis>-<uuid>.<ext>`.
    fn stored_name(&self, upload: &ProofUpload) -> String {
        format!(
            "{}-{}.{}",
            self.clock.utc().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            upload.extension()
        )
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, ProofFileStoreError>
    where
        F: FnOnce(&Dir) -> std::io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || f(&dir))
            .await
            .map_err(ProofFileStoreError::storage)?
            .map_err(ProofFileStoreError::storage)
    }
}

#[async_trait]
impl<C> ProofFileStore for LocalProofFileStore<C>
where
    C: Clock + 'static,
{
    async fn save(&self, upload: &ProofUpload) -> Result<ProofFile, ProofFileStoreError> {
        let name = self.stored_name(upload);
        let bytes = upload.bytes().to_vec();
        let target = name.clone();
        self.run_blocking(move |dir| dir.write(&target, bytes))
            .await?;

        Ok(ProofFile {
            file_url: format!("{UPLOADS_URL_PREFIX}{name}"),
            file_name: upload.file_name().to_owned(),
            mime_type: upload.mime_type().to_owned(),
            file_size: upload.size(),
        })
    }

    async fn remove(&self, file: &ProofFile) -> Result<(), ProofFileStoreError> {
        let name = file
            .file_url
            .strip_prefix(UPLOADS_URL_PREFIX)
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| ProofFileStoreError::ForeignUrl(file.file_url.clone()))?
            .to_owned();
        self.run_blocking(move |dir| dir.remove_file(&name)).await
    }
}
