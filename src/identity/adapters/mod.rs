//! Adapter implementations for identity resolution.

pub mod jwt;

pub use jwt::{JwtPrincipalResolver, PrincipalClaims};
