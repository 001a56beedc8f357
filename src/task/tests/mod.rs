//! Unit tests for task domain rules and lifecycle orchestration.

mod concurrency_tests;
mod proof_flow_tests;
