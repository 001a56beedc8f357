//! Port contracts for identity resolution.

pub mod resolver;

pub use resolver::PrincipalResolver;
