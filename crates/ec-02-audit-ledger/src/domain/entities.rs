//! # Audit Entry Entities
//!
//! Immutable ledger records and the builder used to create them.

use super::errors::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{CorrelationId, CurrencyId, GuildId, ItemId, UserId};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Metadata key holding the correlation id of a multi-step operation.
pub const META_CORRELATION_ID: &str = "correlationId";
/// Metadata key on rollback entries: the correlation id that was reversed.
pub const META_ORIGINAL_CORRELATION_ID: &str = "originalCorrelationId";
/// Metadata key on rollback entries: ids of the entries reversed.
pub const META_REVERSED_ENTRIES: &str = "reversedEntries";
/// Metadata key on rollback entries: whether every entry was reversed.
pub const META_COMPLETE: &str = "complete";

/// Kind of economic operation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Grant,
    Transfer,
    Craft,
    DailyClaim,
    WorkClaim,
    PerkPurchase,
    ItemEquip,
    StoreBuy,
    StoreSell,
    StatusUpdate,
    Rollback,
    ConfigUpdate,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Transfer => "transfer",
            Self::Craft => "craft",
            Self::DailyClaim => "daily_claim",
            Self::WorkClaim => "work_claim",
            Self::PerkPurchase => "perk_purchase",
            Self::ItemEquip => "item_equip",
            Self::StoreBuy => "store_buy",
            Self::StoreSell => "store_sell",
            Self::StatusUpdate => "status_update",
            Self::Rollback => "rollback",
            Self::ConfigUpdate => "config_update",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency movement recorded by an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyData {
    pub currency_id: CurrencyId,
    pub delta: i64,
    pub before_balance: i64,
    pub after_balance: i64,
}

impl CurrencyData {
    /// Build from before/after; the delta is derived.
    pub fn between(currency_id: CurrencyId, before_balance: i64, after_balance: i64) -> Self {
        Self {
            currency_id,
            delta: after_balance.saturating_sub(before_balance),
            before_balance,
            after_balance,
        }
    }
}

/// Item movement recorded by an entry. `quantity` is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub item_id: ItemId,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_quantity: Option<u64>,
}

/// `after - before`, or `None` when the change does not fit in an `i64`.
fn signed_change(before: u64, after: u64) -> Option<i64> {
    if after >= before {
        i64::try_from(after - before).ok()
    } else {
        i64::try_from(before - after).ok().map(|d| -d)
    }
}

fn saturating_change(before: u64, after: u64) -> i64 {
    signed_change(before, after).unwrap_or(if after >= before { i64::MAX } else { i64::MIN })
}

impl ItemData {
    /// Quantities whose change overflows `i64` saturate here and are
    /// rejected by `NewAuditEntry::validate`.
    pub fn between(item_id: ItemId, before: u64, after: u64) -> Self {
        Self {
            item_id,
            quantity: saturating_change(before, after),
            before_quantity: Some(before),
            after_quantity: Some(after),
        }
    }

    /// Signed change this entry applied. Falls back to `quantity` when the
    /// before/after pair was not recorded.
    pub fn applied_delta(&self) -> i64 {
        match (self.before_quantity, self.after_quantity) {
            (Some(before), Some(after)) => saturating_change(before, after),
            _ => self.quantity,
        }
    }
}

/// An entry not yet written. The ledger assigns id, timestamp and sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub operation_type: OperationType,
    pub actor_id: UserId,
    pub target_id: UserId,
    pub guild_id: Option<GuildId>,
    pub currency_data: Option<CurrencyData>,
    pub item_data: Option<ItemData>,
    pub metadata: BTreeMap<String, Value>,
    pub reason: String,
}

impl NewAuditEntry {
    pub fn new(operation_type: OperationType, actor_id: UserId, target_id: UserId) -> Self {
        Self {
            operation_type,
            actor_id,
            target_id,
            guild_id: None,
            currency_data: None,
            item_data: None,
            metadata: BTreeMap::new(),
            reason: String::new(),
        }
    }

    pub fn guild(mut self, guild_id: Option<GuildId>) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn currency(mut self, data: CurrencyData) -> Self {
        self.currency_data = Some(data);
        self
    }

    pub fn item(mut self, data: ItemData) -> Self {
        self.item_data = Some(data);
        self
    }

    pub fn correlation(self, correlation_id: &CorrelationId) -> Self {
        self.meta(META_CORRELATION_ID, Value::String(correlation_id.to_string()))
    }

    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Reject internally inconsistent entries before they reach the store.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(currency) = &self.currency_data {
            let expected = currency
                .after_balance
                .checked_sub(currency.before_balance)
                .ok_or_else(|| LedgerError::InvalidEntry("balance delta overflows".into()))?;
            if currency.delta != expected {
                return Err(LedgerError::InvalidEntry(format!(
                    "currency delta {} does not match {} -> {}",
                    currency.delta, currency.before_balance, currency.after_balance
                )));
            }
        }

        if let Some(item) = &self.item_data {
            if let (Some(before), Some(after)) = (item.before_quantity, item.after_quantity) {
                let expected = signed_change(before, after)
                    .ok_or_else(|| LedgerError::InvalidEntry("item quantity overflows".into()))?;
                if item.quantity != expected {
                    return Err(LedgerError::InvalidEntry(format!(
                        "item quantity {} does not match {} -> {}",
                        item.quantity, before, after
                    )));
                }
            }
        }

        if self.operation_type == OperationType::Rollback
            && !matches!(
                self.metadata.get(META_ORIGINAL_CORRELATION_ID),
                Some(Value::String(_))
            )
        {
            return Err(LedgerError::InvalidEntry(
                "rollback entry without originalCorrelationId".into(),
            ));
        }

        Ok(())
    }

    /// Finalize into a stored entry.
    pub fn into_entry(self, id: Uuid, created_at: DateTime<Utc>, sequence: u64) -> AuditEntry {
        AuditEntry {
            id,
            created_at,
            sequence,
            operation_type: self.operation_type,
            actor_id: self.actor_id,
            target_id: self.target_id,
            guild_id: self.guild_id,
            currency_data: self.currency_data,
            item_data: self.item_data,
            metadata: self.metadata,
            reason: self.reason,
        }
    }
}

/// A persisted, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sequence: u64,
    pub operation_type: OperationType,
    pub actor_id: UserId,
    pub target_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_data: Option<CurrencyData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_data: Option<ItemData>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub reason: String,
}

impl AuditEntry {
    fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.meta_str(META_CORRELATION_ID).map(CorrelationId::from)
    }

    pub fn original_correlation_id(&self) -> Option<CorrelationId> {
        self.meta_str(META_ORIGINAL_CORRELATION_ID)
            .map(CorrelationId::from)
    }

    /// Entry ids listed by a rollback entry. Unparseable ids are skipped.
    pub fn reversed_entries(&self) -> Vec<Uuid> {
        self.metadata
            .get(META_REVERSED_ENTRIES)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|s| Uuid::parse_str(s).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True for a rollback entry that reversed its whole group. Entries
    /// written without the flag count as complete.
    pub fn is_complete_rollback(&self) -> bool {
        self.operation_type == OperationType::Rollback
            && self
                .metadata
                .get(META_COMPLETE)
                .and_then(Value::as_bool)
                .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grant() -> NewAuditEntry {
        NewAuditEntry::new(OperationType::Grant, "admin".into(), "u1".into())
    }

    #[test]
    fn test_operation_type_wire_names() {
        let json = serde_json::to_string(&OperationType::DailyClaim).unwrap();
        assert_eq!(json, r#""daily_claim""#);
        assert_eq!(OperationType::StoreSell.to_string(), "store_sell");
    }

    #[test]
    fn test_validate_accepts_consistent_delta() {
        let entry = grant().currency(CurrencyData::between("coins".into(), 100, 150));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_delta() {
        let entry = grant().currency(CurrencyData {
            currency_id: "coins".into(),
            delta: 10,
            before_balance: 100,
            after_balance: 150,
        });
        assert!(matches!(entry.validate(), Err(LedgerError::InvalidEntry(_))));
    }

    #[test]
    fn test_validate_rejects_rollback_without_original() {
        let entry = NewAuditEntry::new(OperationType::Rollback, "admin".into(), "u1".into());
        assert!(entry.validate().is_err());

        let entry = entry.meta(META_ORIGINAL_CORRELATION_ID, json!("abc"));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_item_delta_fallback() {
        let recorded = ItemData::between("iron_ore".into(), 5, 2);
        assert_eq!(recorded.applied_delta(), -3);

        let bare = ItemData {
            item_id: "iron_ore".into(),
            quantity: 4,
            before_quantity: None,
            after_quantity: None,
        };
        assert_eq!(bare.applied_delta(), 4);
    }

    #[test]
    fn test_validate_rejects_overflowing_item_change() {
        let item = ItemData::between("gem".into(), 0, u64::MAX);
        assert_eq!(item.quantity, i64::MAX);
        let entry = grant().item(item);
        assert!(matches!(entry.validate(), Err(LedgerError::InvalidEntry(_))));

        let entry = grant().item(ItemData::between("gem".into(), u64::MAX, 0));
        assert!(matches!(entry.validate(), Err(LedgerError::InvalidEntry(_))));

        let entry = grant().item(ItemData::between("gem".into(), u64::MAX, u64::MAX - 3));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_metadata_accessors() {
        let id = Uuid::new_v4();
        let entry = NewAuditEntry::new(OperationType::Rollback, "admin".into(), "u1".into())
            .meta(META_ORIGINAL_CORRELATION_ID, json!("tx-1"))
            .meta(META_REVERSED_ENTRIES, json!([id.to_string(), "garbage"]))
            .meta(META_COMPLETE, json!(false))
            .into_entry(Uuid::new_v4(), Utc::now(), 1);

        assert_eq!(entry.original_correlation_id(), Some("tx-1".into()));
        assert_eq!(entry.reversed_entries(), vec![id]);
        assert!(!entry.is_complete_rollback());
        assert!(entry.correlation_id().is_none());
    }

    #[test]
    fn test_entry_camel_case_encoding() {
        let entry = grant()
            .correlation(&"tx-9".into())
            .currency(CurrencyData::between("coins".into(), 0, 5))
            .into_entry(Uuid::new_v4(), Utc::now(), 7);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["operationType"], "grant");
        assert_eq!(json["currencyData"]["afterBalance"], 5);
        assert_eq!(json["metadata"]["correlationId"], "tx-9");
    }
}
