//! Error types for task domain validation, transitions and parsing.

use super::{StepNumber, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("Task title is required")]
    EmptyTitle,

    /// A step number is zero.
    #[error("invalid step number {0}, expected a positive integer")]
    InvalidStepNumber(u32),

    /// Two steps of the same task share a step number.
    #[error("duplicate step number {0}")]
    DuplicateStepNumber(StepNumber),

    /// A step description is empty after trimming.
    #[error("step description must not be empty")]
    EmptyStepDescription,

    /// The task has no step with the requested number.
    #[error("Step not found")]
    StepNotFound {
        /// Task identifier.
        task_id: TaskId,
        /// Requested step number.
        step_number: StepNumber,
    },

    /// Text proof was submitted without text.
    #[error("text is required")]
    EmptyProofText,

    /// File proof was submitted without content.
    #[error("file is required")]
    EmptyProofFile,

    /// The uploaded file type is not accepted as proof.
    #[error("Only JPEG/PNG/MP3/WAV allowed")]
    UnsupportedProofMimeType(String),

    /// The uploaded file exceeds the proof size limit.
    #[error("file exceeds the {limit} byte limit ({size} bytes)")]
    ProofFileTooLarge {
        /// Uploaded size in bytes.
        size: u64,
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// Proof exists and has not been rejected.
    #[error("Proof already submitted. Wait for review or rejection.")]
    ProofAlreadySubmitted(TaskId),

    /// A review was requested for a task that is not awaiting verification.
    #[error("Task is not awaiting verification")]
    NotAwaitingVerification {
        /// Task identifier.
        task_id: TaskId,
        /// Current task status.
        status: TaskStatus,
    },
}

impl TaskDomainError {
    /// Returns `true` when the error reports a violated lifecycle
    /// precondition rather than malformed input.
    #[must_use]
    pub const fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Self::ProofAlreadySubmitted(_) | Self::NotAwaitingVerification { .. }
        )
    }
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing urgency colours.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown urgency color: {0}")]
pub struct ParseUrgencyColorError(pub String);

/// Error returned while parsing review decisions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("decision must be approved or rejected, got '{0}'")]
pub struct ParseReviewDecisionError(pub String);
