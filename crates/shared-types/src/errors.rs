//! # Error Types
//!
//! Defines the error taxonomy shared across subsystems.
//!
//! | Error | Retried | Raised by |
//! |-------|---------|-----------|
//! | `DomainError` | never | compute-next-state functions |
//! | `StorageError` | never | account store / ledger store adapters |
//!
//! Compare-and-swap conflicts are not an error type here: the store signals
//! them with `Ok(None)` and only the transition engine interprets them.

use crate::entities::{AccountStatus, CurrencyId, ItemId, UserId};
use thiserror::Error;

/// Business-rule rejection. Surfaced immediately, no state is mutated and
/// no audit entry is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Debit would take a non-debt balance below zero.
    #[error("Insufficient funds: {currency} required {required}, available {available}")]
    InsufficientFunds {
        currency: CurrencyId,
        required: i64,
        available: i64,
    },

    /// Removal of more items than the slot holds.
    #[error("Insufficient items: {item} required {required}, available {available}")]
    InsufficientItems {
        item: ItemId,
        required: u64,
        available: u64,
    },

    /// Grant would exceed the item's stack limit.
    #[error("Capacity exceeded for {item}: max {max}, attempted {attempted}")]
    CapacityExceeded {
        item: ItemId,
        max: u64,
        attempted: u64,
    },

    /// Feature, recipe or listing is switched off.
    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    /// Account is blocked or banned.
    #[error("Account {user} is {status}")]
    AccountRestricted { user: UserId, status: AccountStatus },

    /// Sender and recipient are the same account.
    #[error("Cannot transfer to yourself")]
    SelfTransfer,

    /// Zero, negative where positive is required, or overflowing amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(CurrencyId),

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Store listing has no stock left.
    #[error("Out of stock: {item} requested {requested}, in stock {available}")]
    OutOfStock {
        item: ItemId,
        requested: u64,
        available: u64,
    },

    /// Per-user purchase limit for a listing reached.
    #[error("Purchase limit reached for {item}: limit {limit}")]
    PurchaseLimitReached { item: ItemId, limit: u64 },

    /// Claim attempted before its cooldown elapsed.
    #[error("Cooldown active for {kind}: {remaining_secs}s remaining")]
    CooldownActive { kind: String, remaining_secs: i64 },
}

/// Fatal I/O failure from an underlying store. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backend unreachable or refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Store client gave up waiting.
    #[error("Storage timeout after {0}ms")]
    Timeout(u64),

    /// Stored document failed its integrity check.
    #[error("Data corruption for {key}: fingerprint mismatch")]
    Corrupted { key: String },

    /// Document could not be decoded into its typed form.
    #[error("Codec error for {key}: {reason}")]
    Codec { key: String, reason: String },

    /// An in-process lock was poisoned by a panicking writer.
    #[error("Lock poisoned")]
    LockPoisoned,
}
