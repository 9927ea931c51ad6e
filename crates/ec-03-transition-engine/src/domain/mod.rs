//! # Domain Module
//!
//! Attempt configuration, snapshots, outcomes and the checked arithmetic
//! every built-in transition shares.

pub mod arithmetic;
pub mod config;
pub mod errors;
pub mod outcome;
pub mod snapshot;

pub use arithmetic::{adjust_balance, adjust_slot, SlotChange, SlotRules};
pub use config::{AttemptConfig, Backoff, DEFAULT_MAX_ATTEMPTS};
pub use errors::EngineError;
pub use outcome::{CurrencyChange, ItemChange, MutationOutcome, StatusChange};
pub use snapshot::{Snapshot, SnapshotScope};
