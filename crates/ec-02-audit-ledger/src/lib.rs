//! # EC-02 Audit Ledger
//!
//! Append-only log of every committed economy mutation.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Entries are never updated or deleted | `ports/outbound.rs` - `LedgerStore` has no update/delete |
//! | Reversal is a new `rollback` entry | `domain/entities.rs` - `NewAuditEntry::validate()` |
//! | Queries are chronological | `adapters/memory_ledger.rs` - sort by `(created_at, sequence)` |
//! | Recorded deltas are consistent | `domain/entities.rs` - `NewAuditEntry::validate()` |
//!
//! ## Ordering
//!
//! `query` always returns entries by `createdAt` ascending (ties broken by
//! the store-assigned `sequence`) so a correlation group replays in the
//! order it was written. A newest-first view is the caller reversing the
//! page, never a different ledger ordering.
//!
//! ## Failure Semantics
//!
//! `create` never fails silently: an insert failure is returned as
//! `LedgerError::Storage`. It does not undo the balance mutation that
//! preceded it; that window is reconciled out of band.

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryLedgerStore;
pub use domain::*;
pub use ports::{AuditLedgerApi, LedgerStore};
pub use service::AuditLedger;
