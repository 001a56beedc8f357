//! Task lifecycle management.
//!
//! Tasks are created inside an organization, decomposed into numbered
//! steps, and closed out through a proof/review loop: the creator or
//! assignee submits text, image or audio proof, and a manager approves or
//! rejects it. Every write is a revision-checked compare-and-swap, so
//! concurrent submissions and reviews cannot both win. The module follows
//! hexagonal architecture:
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
