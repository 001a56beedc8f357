//! Proof of completion submitted against a task.

use super::TaskDomainError;
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted proof upload, in bytes (10 MiB).
pub const MAX_PROOF_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted for file proof.
pub const ACCEPTED_PROOF_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "audio/mpeg", "audio/wav"];

/// Kind of evidence carried by a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Photo evidence.
    Image,
    /// Audio recording.
    Audio,
    /// Free-form text.
    Text,
}

impl ProofKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Text => "text",
        }
    }

    /// Derives the kind of an uploaded file from its MIME type.
    ///
    /// `image/*` is an image; every other accepted upload is audio.
    #[must_use]
    pub fn of_upload(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else {
            Self::Audio
        }
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a stored proof file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFile {
    /// Public URL the file is served from.
    pub file_url: String,
    /// Original file name supplied by the uploader.
    pub file_name: String,
    /// MIME type the file was accepted as.
    pub mime_type: String,
    /// Size in bytes.
    pub file_size: u64,
}

/// Evidence payload, one variant per proof kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "proof_type", rename_all = "snake_case")]
pub enum ProofContent {
    /// Text proof.
    Text {
        /// Submitted text.
        text: String,
    },
    /// Image proof.
    Image(ProofFile),
    /// Audio proof.
    Audio(ProofFile),
}

impl ProofContent {
    /// Creates text proof content.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProofText`] when the text is blank.
    pub fn text(text: impl Into<String>) -> Result<Self, TaskDomainError> {
        let value = text.into();
        if value.trim().is_empty() {
            return Err(TaskDomainError::EmptyProofText);
        }
        Ok(Self::Text { text: value })
    }

    /// Creates file proof content, deriving the kind from the MIME type.
    #[must_use]
    pub fn file(file: ProofFile) -> Self {
        match ProofKind::of_upload(&file.mime_type) {
            ProofKind::Image => Self::Image(file),
            ProofKind::Audio | ProofKind::Text => Self::Audio(file),
        }
    }

    /// Returns the proof kind.
    #[must_use]
    pub const fn kind(&self) -> ProofKind {
        match self {
            Self::Text { .. } => ProofKind::Text,
            Self::Image(_) => ProofKind::Image,
            Self::Audio(_) => ProofKind::Audio,
        }
    }

    /// Returns the stored file, if this is file proof.
    #[must_use]
    pub const fn file_ref(&self) -> Option<&ProofFile> {
        match self {
            Self::Text { .. } => None,
            Self::Image(file) | Self::Audio(file) => Some(file),
        }
    }
}

/// Proof submitted against a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Evidence payload.
    pub content: ProofContent,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// User who submitted the proof.
    pub submitted_by: UserId,
}

/// A file offered as proof, validated before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofUpload {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl ProofUpload {
    /// Validates an uploaded file against the accepted types and size limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProofFile`] for empty content,
    /// [`TaskDomainError::UnsupportedProofMimeType`] for other file types and
    /// [`TaskDomainError::ProofFileTooLarge`] above
    /// [`MAX_PROOF_FILE_BYTES`].
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, TaskDomainError> {
        let mime = mime_type.into().trim().to_ascii_lowercase();
        if !ACCEPTED_PROOF_MIME_TYPES.contains(&mime.as_str()) {
            return Err(TaskDomainError::UnsupportedProofMimeType(mime));
        }
        if bytes.is_empty() {
            return Err(TaskDomainError::EmptyProofFile);
        }
        let size = bytes.len() as u64;
        if size > MAX_PROOF_FILE_BYTES {
            return Err(TaskDomainError::ProofFileTooLarge {
                size,
                limit: MAX_PROOF_FILE_BYTES,
            });
        }
        Ok(Self {
            file_name: file_name.into(),
            mime_type: mime,
            bytes,
        })
    }

    /// Returns the uploader-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the accepted MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the file content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Returns the file extension used when storing this upload.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpeg",
            "image/png" => "png",
            "audio/mpeg" => "mp3",
            "audio/wav" => "wav",
            _ => "bin",
        }
    }
}
