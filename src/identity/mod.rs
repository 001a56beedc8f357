//! Caller identity for request handling.
//!
//! Authentication itself (credentials, token issuance, second factors,
//! federation) happens elsewhere. This module only turns a verified bearer
//! token into a [`domain::Principal`] carrying the caller's role and
//! organization scope:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
