//! Step definitions for proof review behaviour tests.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
