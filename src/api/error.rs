//! Translation of service errors into HTTP responses.

use crate::identity::domain::IdentityError;
use crate::notification::services::NotificationServiceError;
use crate::task::{
    domain::TaskDomainError, ports::TaskRepositoryError, services::TaskLifecycleError,
};
use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

const SERVER_ERROR: &str = "Server error";

/// Internal detail of an unexpected failure, attached to the response so
/// development builds can surface it.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Error response: `{success: false, message}` with a matching status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// Creates an error with a client-facing message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    /// 400 for malformed or missing input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 for absent or out-of-scope resources.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 whose detail is withheld from the response body.
    #[must_use]
    pub fn unexpected(err: &impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: SERVER_ERROR.to_owned(),
            detail: Some(err.to_string()),
        }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorBody {
                success: false,
                message: &self.message,
            }),
        )
            .into_response();
        if let Some(detail) = self.detail {
            error!(status = %self.status, error = %detail, "request failed");
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        let message = match err {
            IdentityError::MissingToken => "Not authorized, no token",
            IdentityError::InvalidToken | IdentityError::UnknownRole(_) => {
                "Not authorized, token failed"
            }
        };
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::Domain(domain) => domain.into(),
            TaskLifecycleError::Repository(TaskRepositoryError::NotFound(_))
            | TaskLifecycleError::NotFound(_) => Self::not_found("Task not found"),
            TaskLifecycleError::Repository(ref inner) => Self::unexpected(inner),
            TaskLifecycleError::Files(ref inner) => Self::unexpected(inner),
            TaskLifecycleError::InvalidDecision(_) => {
                Self::validation("decision must be approved or rejected")
            }
            TaskLifecycleError::InvalidStatus(_) | TaskLifecycleError::InvalidUrgency(_) => {
                Self::validation(err.to_string())
            }
            TaskLifecycleError::NoOrganization
            | TaskLifecycleError::ManagerRequired
            | TaskLifecycleError::NotAuthorized(_) => {
                Self::new(StatusCode::FORBIDDEN, err.to_string())
            }
            TaskLifecycleError::Contention(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
        }
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        match err {
            TaskDomainError::StepNotFound { .. } => Self::not_found(err.to_string()),
            TaskDomainError::ProofFileTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            _ => Self::validation(err.to_string()),
        }
    }
}

impl From<NotificationServiceError> for ApiError {
    fn from(err: NotificationServiceError) -> Self {
        match err {
            NotificationServiceError::NotFound(_) => Self::not_found(err.to_string()),
            NotificationServiceError::Repository(ref inner) => Self::unexpected(inner),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}
