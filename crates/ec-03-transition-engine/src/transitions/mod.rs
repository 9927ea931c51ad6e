//! # Built-in Transitions
//!
//! Every built-in produces a `MutationOutcome` carrying the before/after
//! values audit entries need.

mod adjust;
mod batch;
mod status;

pub use adjust::{AdjustCurrency, AdjustItem};
pub use batch::{Batch, CooldownStamp, ItemDelta};
pub use status::SetStatus;
