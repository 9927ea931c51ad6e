//! # Core Domain Entities
//!
//! Defines the per-user account document and the identifiers used across
//! the economy subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `GuildId`, `CurrencyId`, `ItemId`, `CorrelationId`
//! - **Values**: `CurrencyValue`, `InventorySlot`, `ItemInstance`
//! - **Account**: `AccountState`, `AccountStatus`, `Version`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Platform user identifier. One account document exists per user.
    UserId
);

string_id!(
    /// Guild (community) identifier used to scope audit entries.
    GuildId
);

string_id!(
    /// Currency identifier (e.g. `coins`, `gems`).
    CurrencyId
);

string_id!(
    /// Item identifier. Content ids match `^[a-z0-9_]+$`.
    ItemId
);

string_id!(
    /// Opaque token grouping every audit entry of one logical operation.
    CorrelationId
);

impl CorrelationId {
    /// Generate a fresh random correlation id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Returns true if `value` is a valid content id (`^[a-z0-9_]+$`).
pub fn is_valid_content_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

// =============================================================================
// CLUSTER B: VALUES
// =============================================================================

/// A currency balance, decoded once at the store boundary.
///
/// Mutations always move the *spendable* part: `amount` for a scalar
/// balance and `hand` for a split wallet. The bank part of a split wallet
/// is only touched by explicit deposit/withdraw features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurrencyValue {
    /// Single signed amount.
    Scalar { amount: i64 },
    /// Wallet split between cash on hand and a bank deposit.
    SplitWallet { hand: i64, bank: i64 },
}

impl Default for CurrencyValue {
    fn default() -> Self {
        Self::Scalar { amount: 0 }
    }
}

impl CurrencyValue {
    /// Amount that mutations read and write.
    pub fn spendable(&self) -> i64 {
        match self {
            Self::Scalar { amount } => *amount,
            Self::SplitWallet { hand, .. } => *hand,
        }
    }

    /// Sum of every part of the value.
    pub fn total(&self) -> i64 {
        match self {
            Self::Scalar { amount } => *amount,
            Self::SplitWallet { hand, bank } => hand.saturating_add(*bank),
        }
    }

    /// Same shape, with the spendable part replaced.
    pub fn with_spendable(&self, value: i64) -> Self {
        match self {
            Self::Scalar { .. } => Self::Scalar { amount: value },
            Self::SplitWallet { bank, .. } => Self::SplitWallet {
                hand: value,
                bank: *bank,
            },
        }
    }
}

/// A single non-stackable item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInstance {
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
}

impl ItemInstance {
    /// Create a fresh instance with a random id.
    pub fn fresh(durability: Option<u32>) -> Self {
        Self {
            instance_id: uuid::Uuid::new_v4().to_string(),
            durability,
        }
    }
}

/// An inventory slot. Slots holding zero items are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InventorySlot {
    /// Stackable item: a plain count.
    Stack { quantity: u64 },
    /// Non-stackable item: one record per owned instance.
    Instances { instances: Vec<ItemInstance> },
}

impl InventorySlot {
    /// Number of items in the slot.
    pub fn quantity(&self) -> u64 {
        match self {
            Self::Stack { quantity } => *quantity,
            Self::Instances { instances } => instances.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity() == 0
    }
}

// =============================================================================
// CLUSTER C: ACCOUNT
// =============================================================================

/// Moderation status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Ok,
    Blocked,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Blocked => "blocked",
            Self::Banned => "banned",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document version. Increments by exactly 1 on every successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Per-user economic state.
///
/// ## Fields
///
/// - `balances`: currency id -> value. Negative only after a forced (debt) mutation.
/// - `inventory`: item id -> slot. Empty slots are removed, never stored.
/// - `cooldowns`: claim kind -> unix seconds of the last successful claim.
/// - `status`: changed only by the explicit status-update operation.
/// - `version` / `fingerprint`: change on every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub user_id: UserId,
    #[serde(default)]
    pub balances: BTreeMap<CurrencyId, CurrencyValue>,
    #[serde(default)]
    pub inventory: BTreeMap<ItemId, InventorySlot>,
    #[serde(default)]
    pub cooldowns: BTreeMap<String, i64>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub fingerprint: String,
}

impl AccountState {
    /// A fresh, empty account at version 0.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balances: BTreeMap::new(),
            inventory: BTreeMap::new(),
            cooldowns: BTreeMap::new(),
            status: AccountStatus::Ok,
            version: Version::default(),
            fingerprint: String::new(),
        }
    }

    /// Builder method to seed a scalar balance.
    pub fn with_balance(mut self, currency: impl Into<CurrencyId>, amount: i64) -> Self {
        self.balances
            .insert(currency.into(), CurrencyValue::Scalar { amount });
        self
    }

    /// Builder method to seed a stack of items.
    pub fn with_stack(mut self, item: impl Into<ItemId>, quantity: u64) -> Self {
        if quantity > 0 {
            self.inventory
                .insert(item.into(), InventorySlot::Stack { quantity });
        }
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Spendable balance of a currency; 0 when the currency was never held.
    pub fn balance_of(&self, currency: &CurrencyId) -> i64 {
        self.balances
            .get(currency)
            .map(CurrencyValue::spendable)
            .unwrap_or(0)
    }

    /// Quantity of an item; 0 when the slot does not exist.
    pub fn quantity_of(&self, item: &ItemId) -> u64 {
        self.inventory
            .get(item)
            .map(InventorySlot::quantity)
            .unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Ok
    }
}
