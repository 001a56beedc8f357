//! HS256 JWT verification adapter.
//!
//! Tokens are issued by the authentication service; this adapter only
//! verifies the signature and expiry and reads the principal claims.

use crate::identity::{
    domain::{IdentityError, OrganizationId, Principal, Role, UserId},
    ports::PrincipalResolver,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalClaims {
    /// Subject: the user identifier.
    pub sub: Uuid,
    /// Role name (`manager`, `employee`, `regular`).
    pub role: String,
    /// Organization the user belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,
    /// Expiration as unix seconds.
    pub exp: i64,
}

/// Verifies HS256-signed access tokens with a shared secret.
#[derive(Clone)]
pub struct JwtPrincipalResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtPrincipalResolver {
    /// Creates a resolver for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl std::fmt::Debug for JwtPrincipalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtPrincipalResolver").finish_non_exhaustive()
    }
}

impl PrincipalResolver for JwtPrincipalResolver {
    fn resolve(&self, token: &str) -> Result<Principal, IdentityError> {
        let data = jsonwebtoken::decode::<PrincipalClaims>(token, &self.key, &self.validation)
            .map_err(|_| IdentityError::InvalidToken)?;
        let claims = data.claims;
        let role = Role::try_from(claims.role.as_str())?;
        Ok(Principal::new(
            UserId::from_uuid(claims.sub),
            role,
            claims.org.map(OrganizationId::from_uuid),
        ))
    }
}
