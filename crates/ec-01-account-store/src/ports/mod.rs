//! # Ports Layer
//!
//! `AccountStore` is the driven port the transition engine commits through.

pub mod store;

pub use store::*;
