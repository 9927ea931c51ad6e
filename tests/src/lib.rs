//! # Economy Core Test Suite
//!
//! Cross-crate tests that wire the real container (or a fault-injecting
//! store behind the same services) and drive it end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Container and faulty-store builders
//! └── integration/
//!     ├── scenarios.rs  # Grant, transfer, rollback, rejected debit
//!     ├── concurrency.rs# Racing writers on one account
//!     └── rollback.rs   # Reversal properties across services
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ec-tests
//! cargo test -p ec-tests integration::concurrency::
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
