//! # Domain Module

pub mod catalog;
pub mod errors;
pub mod receipt;
pub mod settings;
pub mod store;

pub use catalog::{
    ItemAmount, ItemCatalog, ItemDefinition, PerkCatalog, PerkDefinition, Recipe, RecipeBook,
    SCHEMA_VERSION,
};
pub use errors::{CatalogError, ServiceError};
pub use receipt::Receipt;
pub use settings::{ClaimConfig, ClaimKind, ServiceSettings};
pub use store::{StockLedger, StockReservation, StoreCatalog, StoreListing, UNLIMITED_STOCK};
