//! # Checked Arithmetic
//!
//! Pure balance and slot math shared by the built-in transitions. Nothing
//! here touches the store.

use shared_types::{CurrencyId, DomainError, InventorySlot, ItemId, ItemInstance};

/// Apply `delta` to a spendable balance.
///
/// A debit that would leave the balance negative is rejected unless
/// `allow_debt`. Credits are always accepted, even onto a debt.
pub fn adjust_balance(
    currency: &CurrencyId,
    current: i64,
    delta: i64,
    allow_debt: bool,
) -> Result<i64, DomainError> {
    let next = current
        .checked_add(delta)
        .ok_or(DomainError::InvalidAmount(delta))?;

    if delta < 0 && next < 0 && !allow_debt {
        let required = delta.checked_neg().ok_or(DomainError::InvalidAmount(delta))?;
        return Err(DomainError::InsufficientFunds {
            currency: currency.clone(),
            required,
            available: current,
        });
    }

    Ok(next)
}

/// How a slot is created when the item is not held yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRules {
    /// Stack counter vs one record per instance.
    pub stackable: bool,
    /// Grants beyond this quantity are rejected.
    pub max_stack: Option<u64>,
}

impl Default for SlotRules {
    fn default() -> Self {
        Self {
            stackable: true,
            max_stack: None,
        }
    }
}

/// Result of applying an item delta to one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    /// New slot; `None` deletes it.
    pub slot: Option<InventorySlot>,
    pub before: u64,
    pub after: u64,
    /// Items that could not be removed (forced mode only).
    pub shortfall: u64,
}

/// Apply a signed item delta to a slot.
///
/// Instance slots grow by appending fresh records and shrink by dropping
/// the most recently added ones first. A slot that reaches zero is deleted.
pub fn adjust_slot(
    item: &ItemId,
    current: Option<&InventorySlot>,
    delta: i64,
    rules: SlotRules,
    force: bool,
) -> Result<SlotChange, DomainError> {
    if delta == 0 {
        return Err(DomainError::InvalidAmount(0));
    }

    let before = current.map(InventorySlot::quantity).unwrap_or(0);
    let magnitude = delta.unsigned_abs();

    if delta > 0 {
        let after = before
            .checked_add(magnitude)
            .ok_or(DomainError::InvalidAmount(delta))?;
        if let Some(max) = rules.max_stack {
            if after > max {
                return Err(DomainError::CapacityExceeded {
                    item: item.clone(),
                    max,
                    attempted: after,
                });
            }
        }

        let slot = match current {
            Some(InventorySlot::Stack { .. }) => InventorySlot::Stack { quantity: after },
            Some(InventorySlot::Instances { instances }) => {
                let mut instances = instances.clone();
                instances.extend((0..magnitude).map(|_| ItemInstance::fresh(None)));
                InventorySlot::Instances { instances }
            }
            None if rules.stackable => InventorySlot::Stack { quantity: after },
            None => InventorySlot::Instances {
                instances: (0..magnitude).map(|_| ItemInstance::fresh(None)).collect(),
            },
        };

        return Ok(SlotChange {
            slot: Some(slot),
            before,
            after,
            shortfall: 0,
        });
    }

    let (removed, shortfall) = if magnitude > before {
        if !force {
            return Err(DomainError::InsufficientItems {
                item: item.clone(),
                required: magnitude,
                available: before,
            });
        }
        (before, magnitude - before)
    } else {
        (magnitude, 0)
    };
    let after = before - removed;

    let slot = match current {
        _ if after == 0 => None,
        Some(InventorySlot::Instances { instances }) => {
            let mut instances = instances.clone();
            instances.truncate(after as usize);
            Some(InventorySlot::Instances { instances })
        }
        _ => Some(InventorySlot::Stack { quantity: after }),
    };

    Ok(SlotChange {
        slot,
        before,
        after,
        shortfall,
    })
}
