//! # Mutation Services
//!
//! One service per user-facing operation. Each runs the same pipeline:
//! rate-limit gate, engine attempt, audit entries under a fresh
//! correlation id, receipt.

pub mod claim;
pub mod crafting;
pub mod currency;
pub mod item;
pub mod perk;
pub mod rollback;
pub mod status;
pub mod store;
pub mod transfer;

pub use claim::ClaimService;
pub use crafting::CraftingService;
pub use currency::CurrencyService;
pub use item::ItemService;
pub use perk::PerkService;
pub use rollback::RollbackService;
pub use status::StatusService;
pub use store::StoreService;
pub use transfer::TransferService;

use crate::domain::ServiceError;
use shared_types::DomainError;

/// Convert a positive quantity into an engine delta.
pub(crate) fn quantity_delta(quantity: u64) -> Result<i64, ServiceError> {
    match i64::try_from(quantity) {
        Ok(0) => Err(DomainError::InvalidAmount(0).into()),
        Ok(delta) => Ok(delta),
        Err(_) => Err(DomainError::InvalidAmount(i64::MAX).into()),
    }
}

/// `unit * quantity` as a currency amount.
pub(crate) fn total_price(unit: i64, quantity: u64) -> Result<i64, ServiceError> {
    let quantity = quantity_delta(quantity)?;
    unit.checked_mul(quantity)
        .ok_or_else(|| DomainError::InvalidAmount(unit).into())
}

/// `quantity * times` as an item delta.
pub(crate) fn scaled(quantity: u64, times: u32) -> Result<i64, ServiceError> {
    let total = quantity
        .checked_mul(u64::from(times))
        .ok_or(DomainError::InvalidAmount(i64::MAX))?;
    quantity_delta(total)
}
