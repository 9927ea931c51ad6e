//! # EC-04 Rollback Coordinator
//!
//! Reverses a correlation group: finds every audit entry sharing a
//! correlation id, replays the inverse deltas through the transition engine
//! in forced mode and writes one `rollback` entry.
//!
//! **Subsystem ID:** 4
//!
//! ## Group Lifecycle
//!
//! ```text
//! Unknown ──(first entry written)──→ Open ──(complete rollback)──→ RolledBack
//!                                      │  ↑
//!                                      └──┘ partial rollback (complete = false)
//! ```
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | At most one complete reversal | complete rollback entry checked first |
//! | No concurrent double-reversal in-process | in-flight claim set (`InProgress`) |
//! | Retry after partial failure | entries listed by partial rollbacks are skipped |
//! | One commit per affected account | inverses grouped into one `Batch` per target |
//!
//! Inverses are `before - after` (items fall back to `-quantity` when the
//! entry has no before/after pair), netted per key within each account. An
//! account whose inverses cancel out is marked reversed without a commit.
//! Restored item slots take their shape from an [`ItemRules`] lookup. Forced mode lets a reversed credit push
//! a balance into debt when the recipient already spent it.

#![warn(clippy::all)]

pub mod coordinator;
pub mod domain;

pub use coordinator::RollbackCoordinator;
pub use domain::{
    CorrelationGroupState, ItemRules, RollbackError, RollbackPlan, RollbackReport, StackAll,
};
