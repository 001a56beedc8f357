//! Domain model for task lifecycle management.
//!
//! The task domain models creation, free-form editing, step completion and
//! the proof/review verification flow while keeping all infrastructure
//! concerns outside of the domain boundary.

mod access;
mod error;
mod ids;
mod proof;
mod review;
mod status;
mod step;
mod task;

pub use access::{TaskQuery, TaskScope, can_access_task};
pub use error::{
    ParseReviewDecisionError, ParseTaskStatusError, ParseUrgencyColorError, TaskDomainError,
};
pub use ids::{StepNumber, TaskId};
pub use proof::{
    ACCEPTED_PROOF_MIME_TYPES, MAX_PROOF_FILE_BYTES, Proof, ProofContent, ProofFile, ProofKind,
    ProofUpload,
};
pub use review::{ManagerReview, ReviewDecision};
pub use status::{TaskStatus, UrgencyColor};
pub use step::{Step, number_steps, progress_percent};
pub use task::{DEFAULT_CATEGORY, NewTask, PersistedTaskData, Task, TaskEdit};
