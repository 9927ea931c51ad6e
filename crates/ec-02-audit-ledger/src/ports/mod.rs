//! # Ports Module
//!
//! - Inbound: what the ledger offers (`AuditLedgerApi`)
//! - Outbound: what the ledger needs (`LedgerStore`)

pub mod inbound;
pub mod outbound;

pub use inbound::AuditLedgerApi;
pub use outbound::LedgerStore;
