//! # Domain Module
//!
//! Audit entry model, query filters and ledger errors.

pub mod entities;
pub mod errors;
pub mod query;

pub use entities::*;
pub use errors::*;
pub use query::*;
