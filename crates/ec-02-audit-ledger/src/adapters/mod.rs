//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `LedgerStore` port.

mod memory_ledger;

pub use memory_ledger::InMemoryLedgerStore;
