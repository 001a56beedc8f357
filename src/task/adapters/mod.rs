//! Adapter implementations for task ports.

pub mod files;
pub mod memory;
pub mod postgres;
