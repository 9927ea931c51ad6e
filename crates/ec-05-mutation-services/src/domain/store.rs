//! # Store Listings and Stock
//!
//! `StoreCatalog` holds what can be bought and sold and at which price.
//! `StockLedger` tracks remaining stock and per-user purchase counts in
//! process. A reservation is taken before the balance mutation and
//! released when the mutation does not commit.

use super::catalog::ItemCatalog;
use super::errors::CatalogError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{DomainError, ItemId, UserId};
use std::collections::{BTreeMap, HashMap};

/// Stock value meaning "never runs out".
pub const UNLIMITED_STOCK: i64 = -1;

fn default_unlimited() -> i64 {
    UNLIMITED_STOCK
}

fn default_true() -> bool {
    true
}

/// One buyable/sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub item_id: ItemId,
    pub buy_price: i64,
    /// 0 means the store does not buy the item back.
    #[serde(default)]
    pub sell_price: i64,
    #[serde(default = "default_unlimited")]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub available: bool,
    /// Per-user cap on purchases; 0 is unlimited.
    #[serde(default)]
    pub purchase_limit: u64,
}

impl StoreListing {
    pub fn new(item_id: impl Into<ItemId>, buy_price: i64, sell_price: i64) -> Self {
        Self {
            item_id: item_id.into(),
            buy_price,
            sell_price,
            stock: UNLIMITED_STOCK,
            available: true,
            purchase_limit: 0,
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_purchase_limit(mut self, limit: u64) -> Self {
        self.purchase_limit = limit;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.stock == UNLIMITED_STOCK
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |field: &'static str, reason: &str| CatalogError::InvalidField {
            id: self.item_id.to_string(),
            field,
            reason: reason.to_string(),
        };
        if self.buy_price < 0 {
            return Err(invalid("buyPrice", "must not be negative"));
        }
        if self.sell_price < 0 {
            return Err(invalid("sellPrice", "must not be negative"));
        }
        if self.stock < UNLIMITED_STOCK {
            return Err(invalid("stock", "must be -1 or at least 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ListingPack {
    #[serde(default)]
    listings: Vec<StoreListing>,
}

/// Validated listings, each referencing a known item.
#[derive(Debug, Clone, Default)]
pub struct StoreCatalog {
    listings: BTreeMap<ItemId, StoreListing>,
}

impl StoreCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, listing: StoreListing, items: &ItemCatalog) -> Result<(), CatalogError> {
        listing.validate()?;
        if !items.contains(&listing.item_id) {
            return Err(CatalogError::UnknownReference {
                from: "store".into(),
                item: listing.item_id.to_string(),
            });
        }
        if self.listings.contains_key(&listing.item_id) {
            return Err(CatalogError::Duplicate(listing.item_id.to_string()));
        }
        self.listings.insert(listing.item_id.clone(), listing);
        Ok(())
    }

    pub fn from_json(json: &str, items: &ItemCatalog) -> Result<Self, CatalogError> {
        let pack: ListingPack =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut catalog = Self::new();
        for listing in pack.listings {
            catalog.insert(listing, items)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, item: &ItemId) -> Option<&StoreListing> {
        self.listings.get(item)
    }

    pub fn listings(&self) -> impl Iterator<Item = &StoreListing> {
        self.listings.values()
    }
}

/// A held stock reservation. Must be committed or released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub item: ItemId,
    pub user: UserId,
    pub quantity: u64,
    /// Whether the stock counter was decremented (false for unlimited).
    counted: bool,
}

#[derive(Debug, Default)]
struct StockState {
    remaining: HashMap<ItemId, u64>,
    purchased: HashMap<(UserId, ItemId), u64>,
}

/// In-process stock counter and purchase-limit tracker.
#[derive(Debug, Default)]
pub struct StockLedger {
    state: Mutex<StockState>,
}

impl StockLedger {
    /// Seed remaining stock from the catalog's finite listings.
    pub fn from_catalog(catalog: &StoreCatalog) -> Self {
        let remaining = catalog
            .listings()
            .filter(|l| !l.is_unlimited())
            .map(|l| (l.item_id.clone(), l.stock as u64))
            .collect();
        Self {
            state: Mutex::new(StockState {
                remaining,
                purchased: HashMap::new(),
            }),
        }
    }

    /// Atomically check stock and the user's purchase limit and take both.
    pub fn reserve(
        &self,
        listing: &StoreListing,
        user: &UserId,
        quantity: u64,
    ) -> Result<StockReservation, DomainError> {
        let mut state = self.state.lock();
        let key = (user.clone(), listing.item_id.clone());

        if listing.purchase_limit > 0 {
            let bought = state.purchased.get(&key).copied().unwrap_or(0);
            if bought.saturating_add(quantity) > listing.purchase_limit {
                return Err(DomainError::PurchaseLimitReached {
                    item: listing.item_id.clone(),
                    limit: listing.purchase_limit,
                });
            }
        }

        let counted = !listing.is_unlimited();
        if counted {
            let remaining = state.remaining.entry(listing.item_id.clone()).or_insert(0);
            if *remaining < quantity {
                return Err(DomainError::OutOfStock {
                    item: listing.item_id.clone(),
                    requested: quantity,
                    available: *remaining,
                });
            }
            *remaining -= quantity;
        }
        *state.purchased.entry(key).or_insert(0) += quantity;

        Ok(StockReservation {
            item: listing.item_id.clone(),
            user: user.clone(),
            quantity,
            counted,
        })
    }

    /// Return a reservation whose purchase did not commit.
    pub fn release(&self, reservation: StockReservation) {
        let mut state = self.state.lock();
        if reservation.counted {
            *state.remaining.entry(reservation.item.clone()).or_insert(0) += reservation.quantity;
        }
        if let Some(bought) = state.purchased.get_mut(&(reservation.user, reservation.item)) {
            *bought = bought.saturating_sub(reservation.quantity);
        }
    }

    /// Put sold-back items into finite stock.
    pub fn restock(&self, listing: &StoreListing, quantity: u64) {
        if listing.is_unlimited() {
            return;
        }
        *self
            .state
            .lock()
            .remaining
            .entry(listing.item_id.clone())
            .or_insert(0) += quantity;
    }

    /// Undo a committed purchase: stock and the buyer's count go back.
    pub fn unwind_purchase(&self, listing: &StoreListing, user: &UserId, quantity: u64) {
        let mut state = self.state.lock();
        if !listing.is_unlimited() {
            *state.remaining.entry(listing.item_id.clone()).or_insert(0) += quantity;
        }
        if let Some(bought) = state.purchased.get_mut(&(user.clone(), listing.item_id.clone())) {
            *bought = bought.saturating_sub(quantity);
        }
    }

    /// Undo a committed sale. Stock already bought by others stays sold.
    pub fn unwind_sale(&self, listing: &StoreListing, quantity: u64) {
        if listing.is_unlimited() {
            return;
        }
        if let Some(remaining) = self.state.lock().remaining.get_mut(&listing.item_id) {
            *remaining = remaining.saturating_sub(quantity);
        }
    }

    /// Remaining stock; `None` for unlimited or unknown items.
    pub fn remaining(&self, item: &ItemId) -> Option<u64> {
        self.state.lock().remaining.get(item).copied()
    }

    pub fn purchased(&self, user: &UserId, item: &ItemId) -> u64 {
        self.state
            .lock()
            .purchased
            .get(&(user.clone(), item.clone()))
            .copied()
            .unwrap_or(0)
    }
}
