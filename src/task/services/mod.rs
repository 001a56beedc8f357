//! Application services for task lifecycle orchestration.

mod lifecycle;
mod notices;

pub use lifecycle::{
    CreateTaskRequest, FileProofRequest, MAX_UPDATE_ATTEMPTS, ReviewProofRequest,
    TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService, UpdateTaskRequest,
};
