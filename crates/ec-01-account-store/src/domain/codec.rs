//! # Account Document Codec
//!
//! Single typed encode/decode step at the persistence boundary.
//!
//! ## Format
//!
//! JSON with camelCase keys; currency and inventory values are tagged
//! unions (`kind` discriminator). The `fingerprint` field holds the
//! hex-encoded SHA-256 of the document encoded with an empty fingerprint.
//!
//! ## Decode Rules
//!
//! - Unparseable bytes or unknown `kind` tags → `StorageError::Codec`
//! - Document stored under a different user id → `StorageError::Codec`
//! - Stored zero-quantity inventory slot → `StorageError::Codec`
//! - Fingerprint mismatch → `StorageError::Corrupted`

use sha2::{Digest, Sha256};
use shared_types::{AccountState, StorageError, UserId};

/// Stateless codec for account documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountCodec;

impl AccountCodec {
    /// Stamp the fingerprint on `state` and encode it.
    pub fn encode(state: &mut AccountState) -> Result<Vec<u8>, StorageError> {
        state.fingerprint = Self::fingerprint(state)?;
        serde_json::to_vec(state).map_err(|e| StorageError::Codec {
            key: state.user_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Decode and verify a stored document.
    pub fn decode(user_id: &UserId, bytes: &[u8]) -> Result<AccountState, StorageError> {
        let state: AccountState =
            serde_json::from_slice(bytes).map_err(|e| StorageError::Codec {
                key: user_id.to_string(),
                reason: e.to_string(),
            })?;

        if &state.user_id != user_id {
            return Err(StorageError::Codec {
                key: user_id.to_string(),
                reason: format!("document belongs to {}", state.user_id),
            });
        }

        if let Some((item, _)) = state.inventory.iter().find(|(_, slot)| slot.is_empty()) {
            return Err(StorageError::Codec {
                key: user_id.to_string(),
                reason: format!("empty inventory slot stored for {item}"),
            });
        }

        if Self::fingerprint(&state)? != state.fingerprint {
            return Err(StorageError::Corrupted {
                key: user_id.to_string(),
            });
        }

        Ok(state)
    }

    /// Hex SHA-256 of the document encoded with an empty fingerprint.
    pub fn fingerprint(state: &AccountState) -> Result<String, StorageError> {
        let mut unstamped = state.clone();
        unstamped.fingerprint.clear();
        let bytes = serde_json::to_vec(&unstamped).map_err(|e| StorageError::Codec {
            key: state.user_id.to_string(),
            reason: e.to_string(),
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{CurrencyValue, InventorySlot, ItemInstance, Version};

    fn account() -> AccountState {
        let mut state = AccountState::new("u1".into())
            .with_balance("coins", 100)
            .with_stack("iron_ore", 5);
        state
            .balances
            .insert("gold".into(), CurrencyValue::SplitWallet { hand: 3, bank: 40 });
        state.inventory.insert(
            "pickaxe".into(),
            InventorySlot::Instances {
                instances: vec![ItemInstance::fresh(Some(50))],
            },
        );
        state.version = Version(4);
        state
    }

    #[test]
    fn test_encode_decode() {
        let mut state = account();
        let bytes = AccountCodec::encode(&mut state).unwrap();
        assert_eq!(state.fingerprint.len(), 64);

        let decoded = AccountCodec::decode(&"u1".into(), &bytes).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_tampered_document_is_corrupted() {
        let mut state = account();
        let bytes = AccountCodec::encode(&mut state).unwrap();
        let tampered = String::from_utf8(bytes)
            .unwrap()
            .replace("\"amount\":100", "\"amount\":999");

        let result = AccountCodec::decode(&"u1".into(), tampered.as_bytes());
        assert!(matches!(result, Err(StorageError::Corrupted { .. })));
    }

    #[test]
    fn test_wrong_owner_rejected() {
        let mut state = account();
        let bytes = AccountCodec::encode(&mut state).unwrap();

        let result = AccountCodec::decode(&"u2".into(), &bytes);
        assert!(matches!(result, Err(StorageError::Codec { .. })));
    }

    #[test]
    fn test_malformed_value_not_coerced() {
        let raw = br#"{"userId":"u1","balances":{"coins":"lots"},"fingerprint":""}"#;
        let result = AccountCodec::decode(&"u1".into(), raw);
        assert!(matches!(result, Err(StorageError::Codec { .. })));
    }

    #[test]
    fn test_stored_zero_slot_rejected() {
        let mut state = AccountState::new("u1".into());
        state
            .inventory
            .insert("wood".into(), InventorySlot::Stack { quantity: 0 });
        state.fingerprint = AccountCodec::fingerprint(&state).unwrap();
        let bytes = serde_json::to_vec(&state).unwrap();

        let result = AccountCodec::decode(&"u1".into(), &bytes);
        assert!(matches!(result, Err(StorageError::Codec { .. })));
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = account();
        let b = account().with_balance("coins", 101);
        assert_ne!(
            AccountCodec::fingerprint(&a).unwrap(),
            AccountCodec::fingerprint(&b).unwrap()
        );
    }
}
