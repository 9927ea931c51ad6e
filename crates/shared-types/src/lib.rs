//! # Shared Types Crate
//!
//! This crate contains the account entities, value unions and error types
//! shared by the account store, audit ledger, transition engine, rollback
//! coordinator and the mutation services.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Tagged Unions at the Boundary**: Currency and inventory values are
//!   explicit enums (`CurrencyValue`, `InventorySlot`), decoded once by the
//!   store codec and never re-interpreted downstream.
//! - **Error Taxonomy**: `DomainError` is a business rejection and is never
//!   retried; `StorageError` is a fatal I/O failure and is never retried
//!   either. Only compare-and-swap conflicts are retried, inside the engine.

pub mod entities;
pub mod errors;
pub mod rate_limiter;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use rate_limiter::{ActionRateLimiter, RateDecision, SlidingWindowLimiter, UnlimitedRateLimiter};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
