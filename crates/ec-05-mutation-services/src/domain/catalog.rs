//! # Content Catalogs
//!
//! Static definitions the services validate against: items, recipes and
//! perks. Packs are JSON documents (`{"schemaVersion": 1, "items": [...]}`)
//! with camelCase keys and are validated once on load.

use super::errors::CatalogError;
use ec_03_transition_engine::SlotRules;
use ec_04_rollback::ItemRules;
use serde::{Deserialize, Serialize};
use shared_types::{is_valid_content_id, DomainError, ItemId};
use std::collections::BTreeMap;

/// Only pack schema this build understands.
pub const SCHEMA_VERSION: u32 = 1;

fn default_max_stack() -> u64 {
    99
}

fn default_true() -> bool {
    true
}

fn default_schema() -> u32 {
    SCHEMA_VERSION
}

fn check_id(id: &str) -> Result<(), CatalogError> {
    if is_valid_content_id(id) {
        Ok(())
    } else {
        Err(CatalogError::InvalidId(id.to_string()))
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Static item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    #[serde(default = "default_max_stack")]
    pub max_stack: u64,
    /// Stackable (counter) vs instance (one record per item).
    #[serde(default = "default_true")]
    pub can_stack: bool,
    #[serde(default)]
    pub value: i64,
}

impl ItemDefinition {
    pub fn stackable(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_stack: default_max_stack(),
            can_stack: true,
            value: 0,
        }
    }

    pub fn instance(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            can_stack: false,
            ..Self::stackable(id, name)
        }
    }

    pub fn with_max_stack(mut self, max_stack: u64) -> Self {
        self.max_stack = max_stack;
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    /// Slot rules the engine enforces for this item.
    pub fn rules(&self) -> SlotRules {
        SlotRules {
            stackable: self.can_stack,
            max_stack: Some(self.max_stack),
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        check_id(self.id.as_str())?;
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidField {
                id: self.id.to_string(),
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.max_stack < 1 {
            return Err(CatalogError::InvalidField {
                id: self.id.to_string(),
                field: "maxStack",
                reason: "must be at least 1".into(),
            });
        }
        if self.value < 0 {
            return Err(CatalogError::InvalidField {
                id: self.id.to_string(),
                field: "value",
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemPack {
    #[serde(default = "default_schema")]
    schema_version: u32,
    #[serde(default)]
    items: Vec<ItemDefinition>,
}

/// Validated set of item definitions.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, ItemDefinition>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        if self.items.contains_key(&definition.id) {
            return Err(CatalogError::Duplicate(definition.id.to_string()));
        }
        self.items.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Builder form of `insert`.
    pub fn with(mut self, definition: ItemDefinition) -> Result<Self, CatalogError> {
        self.insert(definition)?;
        Ok(self)
    }

    /// Parse and validate an items pack.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let pack: ItemPack =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        if pack.schema_version != SCHEMA_VERSION {
            return Err(CatalogError::SchemaVersion(pack.schema_version));
        }
        let mut catalog = Self::new();
        for item in pack.items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    /// Lookup that fails the way services report it.
    pub fn require(&self, id: &ItemId) -> Result<&ItemDefinition, DomainError> {
        self.get(id).ok_or_else(|| DomainError::UnknownItem(id.clone()))
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }
}

impl ItemRules for ItemCatalog {
    /// Unknown items restore as plain stacks.
    fn slot_rules(&self, item: &ItemId) -> SlotRules {
        self.get(item).map(ItemDefinition::rules).unwrap_or_default()
    }
}

// =============================================================================
// RECIPES
// =============================================================================

/// An item quantity in a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAmount {
    pub item_id: ItemId,
    pub quantity: u64,
}

impl ItemAmount {
    pub fn new(item_id: impl Into<ItemId>, quantity: u64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Crafting recipe: inputs (and a currency cost) become outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub inputs: Vec<ItemAmount>,
    pub outputs: Vec<ItemAmount>,
    /// Charged in the primary currency per craft.
    #[serde(default)]
    pub currency_cost: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Recipes keyed by id, cross-checked against an item catalog.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: BTreeMap<String, Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, recipe: Recipe, items: &ItemCatalog) -> Result<(), CatalogError> {
        check_id(&recipe.id)?;
        if self.recipes.contains_key(&recipe.id) {
            return Err(CatalogError::Duplicate(recipe.id));
        }
        if recipe.outputs.is_empty() {
            return Err(CatalogError::InvalidField {
                id: recipe.id,
                field: "outputs",
                reason: "must not be empty".into(),
            });
        }
        if recipe.currency_cost < 0 {
            return Err(CatalogError::InvalidField {
                id: recipe.id,
                field: "currencyCost",
                reason: "must not be negative".into(),
            });
        }
        for amount in recipe.inputs.iter().chain(&recipe.outputs) {
            if !items.contains(&amount.item_id) {
                return Err(CatalogError::UnknownReference {
                    from: recipe.id.clone(),
                    item: amount.item_id.to_string(),
                });
            }
            if amount.quantity == 0 {
                return Err(CatalogError::InvalidField {
                    id: recipe.id.clone(),
                    field: "quantity",
                    reason: format!("{} must be at least 1", amount.item_id),
                });
            }
        }
        self.recipes.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

// =============================================================================
// PERKS
// =============================================================================

/// A one-time purchasable perk, held as a single perk item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkDefinition {
    pub id: String,
    pub name: String,
    pub cost: i64,
    /// Item granted on purchase; ownership is the item's presence.
    pub item_id: ItemId,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PerkCatalog {
    perks: BTreeMap<String, PerkDefinition>,
}

impl PerkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, perk: PerkDefinition) -> Result<(), CatalogError> {
        check_id(&perk.id)?;
        check_id(perk.item_id.as_str())?;
        if perk.cost < 0 {
            return Err(CatalogError::InvalidField {
                id: perk.id,
                field: "cost",
                reason: "must not be negative".into(),
            });
        }
        if self.perks.contains_key(&perk.id) {
            return Err(CatalogError::Duplicate(perk.id));
        }
        self.perks.insert(perk.id.clone(), perk);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PerkDefinition> {
        self.perks.get(id)
    }
}
