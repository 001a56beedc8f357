//! Unit tests for the notification inbox.
