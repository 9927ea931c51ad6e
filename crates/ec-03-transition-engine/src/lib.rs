//! # EC-03 Transition Engine
//!
//! Generic optimistic-concurrency loop: read a fresh snapshot, compute the
//! next state with a pure function, commit with compare-and-swap, retry on
//! conflict.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Attempt Flow
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌──────────────┐    ┌─────────┐
//! │  read()  │───→│ status gate│───→│ compute_next │───→│  CAS    │
//! └──────────┘    └────────────┘    └──────────────┘    └─────────┘
//!      ↑                                  │ DomainError      │ None
//!      │                                  ↓                  │
//!      │                              return (no write)      │
//!      └─────────────── retry while attempts remain ─────────┘
//! ```
//!
//! ## Error Semantics
//!
//! | Failure | Retried | Surfaces as |
//! |---------|---------|-------------|
//! | `DomainError` from `compute_next` | never | `EngineError::Domain` |
//! | CAS precondition failed | up to `max_attempts` | `EngineError::Conflict` (`<OP>_CONFLICT`) |
//! | Store failure | never | `EngineError::Storage` |
//!
//! ## Forced Mode
//!
//! `AttemptConfig::forced()` allows balances to go negative (debt), clamps
//! item removals at zero and skips the account-status gate. Only rollback
//! and transfer compensation use it.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;
pub mod transitions;

pub use domain::*;
pub use ports::Transition;
pub use service::TransitionEngine;
pub use transitions::{AdjustCurrency, AdjustItem, Batch, CooldownStamp, ItemDelta, SetStatus};
