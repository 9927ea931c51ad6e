//! Cross-crate integration tests.

pub mod concurrency;
pub mod rollback;
pub mod scenarios;
