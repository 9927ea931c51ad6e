//! # Domain Module
//!
//! Write patches, compare-and-swap preconditions and the document codec.

pub mod codec;
pub mod patch;

pub use codec::*;
pub use patch::*;
