//! Request extractors: bearer authentication and JSON bodies with
//! envelope-shaped rejections.

use super::{ApiError, AppState, Backend};
use crate::identity::domain::{IdentityError, Principal};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// JSON body whose rejection renders as an [`ApiError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The verified caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Principal);

#[async_trait]
impl<B: Backend> FromRequestParts<AppState<B>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(IdentityError::MissingToken)?;
        Ok(Self(state.resolver().resolve(token)?))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Parses a task identifier from a path segment.
///
/// Malformed identifiers are reported as missing tasks.
pub(super) fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    Uuid::parse_str(raw)
        .map(TaskId::from_uuid)
        .map_err(|_| ApiError::not_found("Task not found"))
}
