//! # EC-01 Account State Store
//!
//! Per-user economic documents with single-document compare-and-swap.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Role in System
//!
//! - **Leaf dependency**: holds one document per user (balances, inventory,
//!   cooldowns, status, version, fingerprint)
//! - **Read**: ensure semantics, an unknown user yields a fresh account
//! - **Write**: compare-and-swap only; `Ok(None)` signals a lost race
//!
//! ## Module Structure
//!
//! ```text
//! ec-01-account-store/
//! ├── domain/     # NextState patches, CAS expectations, typed codec
//! ├── ports/      # AccountStore trait
//! └── adapters/   # In-memory store, fault-injecting wrapper
//! ```
//!
//! ## Boundary Codec
//!
//! Documents are persisted as encoded bytes and decoded exactly once per
//! read by `AccountCodec`. Malformed documents surface as
//! `StorageError::Codec` / `StorageError::Corrupted`, never as silently
//! coerced defaults.

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FaultPlan, FaultyAccountStore, InMemoryAccountStore, StoreStats};
pub use domain::{AccountCodec, Expectation, NextState};
pub use ports::AccountStore;
