//! Durable per-user notification inbox.
//!
//! Task lifecycle transitions emit notifications through the
//! [`ports::NotificationRepository`] port; users read their own inbox and
//! flip the read flag through [`services::NotificationService`]. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
