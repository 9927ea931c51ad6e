//! # Brutal Modular Benchmarks
//!
//! Each subsystem gets benchmarks that push it under contention rather
//! than measure the happy path alone.
//!
//! ## Structure
//!
//! - `ec_02_ledger` - append throughput, correlation lookups over a large log
//! - `ec_03_engine` - uncontended attempts, hot-key contention, batch width
//! - `ec_04_rollback` - reversing a transfer-shaped group

pub mod ec_02_ledger;
pub mod ec_03_engine;
pub mod ec_04_rollback;
