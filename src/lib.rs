//! Equitask: task tracking with proof-backed completion.
//!
//! Managers hand out tasks inside an organization; whoever does the work
//! submits proof, and a manager verifies or rejects it. Notifications keep
//! everyone informed along the way.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, files, tokens)
//!
//! # Modules
//!
//! - [`identity`]: Authenticated principals and bearer token verification
//! - [`task`]: Task records, steps, proof submission and review
//! - [`notification`]: Per-user notification inbox
//! - [`api`]: HTTP surface over the services
//! - [`config`]: Environment-driven runtime configuration

pub mod api;
pub mod config;
pub mod identity;
pub mod notification;
pub mod task;
