//! Error types for identity resolution.

use thiserror::Error;

/// Errors returned while resolving the caller's identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No bearer credential was presented.
    #[error("missing bearer token")]
    MissingToken,

    /// The credential could not be verified or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The credential verified but carries an unknown role.
    #[error(transparent)]
    UnknownRole(#[from] ParseRoleError),
}

/// Error returned while parsing a role name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
