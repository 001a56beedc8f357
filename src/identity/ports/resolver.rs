//! Port that turns a bearer credential into a [`Principal`].

use crate::identity::domain::{IdentityError, Principal};

/// Resolves the authenticated caller from a bearer token.
pub trait PrincipalResolver: Send + Sync {
    /// Verifies `token` and returns the principal it identifies.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidToken`] when verification fails and
    /// [`IdentityError::UnknownRole`] when the token names an unknown role.
    fn resolve(&self, token: &str) -> Result<Principal, IdentityError>;
}
