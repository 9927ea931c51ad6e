//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `AccountStore` port.

mod fault;
mod memory_store;

pub use fault::{FaultPlan, FaultyAccountStore};
pub use memory_store::{InMemoryAccountStore, StoreStats};
