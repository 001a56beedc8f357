//! Filesystem adapter for proof uploads.

mod local;

pub use local::LocalProofFileStore;
