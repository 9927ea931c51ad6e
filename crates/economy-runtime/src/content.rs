//! # Content Packs
//!
//! Loads item, recipe, perk and store definitions from a directory of JSON
//! files, or falls back to a small built-in set.
//!
//! | File | Shape |
//! |------|-------|
//! | `items.json` | `{"schemaVersion": 1, "items": [...]}` |
//! | `recipes.json` | `{"recipes": [...]}` |
//! | `perks.json` | `{"perks": [...]}` |
//! | `store.json` | `{"listings": [...]}` |
//!
//! Only `items.json` is required. References are checked after every file
//! is parsed, so a recipe naming an unknown item fails the whole load.

use crate::container::ConfigError;
use ec_05_mutation_services::{
    CatalogError, ItemAmount, ItemCatalog, ItemDefinition, PerkCatalog, PerkDefinition, Recipe,
    RecipeBook, StoreCatalog, StoreListing,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RecipePack {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
struct PerkPack {
    #[serde(default)]
    perks: Vec<PerkDefinition>,
}

/// Every catalog the services need.
#[derive(Debug, Clone, Default)]
pub struct ContentPacks {
    pub items: ItemCatalog,
    pub recipes: RecipeBook,
    pub perks: PerkCatalog,
    pub store: StoreCatalog,
}

fn content_error(file: &str, err: impl ToString) -> ConfigError {
    ConfigError::Content {
        file: file.to_string(),
        reason: err.to_string(),
    }
}

fn read_optional(dir: &Path, file: &str) -> Result<Option<String>, ConfigError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| content_error(file, e))
}

impl ContentPacks {
    /// Load every pack under `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let items_json = read_optional(dir, "items.json")?
            .ok_or_else(|| content_error("items.json", "file not found"))?;
        let items = ItemCatalog::from_json(&items_json).map_err(|e| content_error("items.json", e))?;

        let mut recipes = RecipeBook::new();
        if let Some(json) = read_optional(dir, "recipes.json")? {
            let pack: RecipePack =
                serde_json::from_str(&json).map_err(|e| content_error("recipes.json", e))?;
            for recipe in pack.recipes {
                recipes
                    .insert(recipe, &items)
                    .map_err(|e| content_error("recipes.json", e))?;
            }
        }

        let mut perks = PerkCatalog::new();
        if let Some(json) = read_optional(dir, "perks.json")? {
            let pack: PerkPack =
                serde_json::from_str(&json).map_err(|e| content_error("perks.json", e))?;
            for perk in pack.perks {
                perks.insert(perk).map_err(|e| content_error("perks.json", e))?;
            }
        }

        let store = match read_optional(dir, "store.json")? {
            Some(json) => {
                StoreCatalog::from_json(&json, &items).map_err(|e| content_error("store.json", e))?
            }
            None => StoreCatalog::new(),
        };

        info!(
            dir = %dir.display(),
            items = items.len(),
            recipes = recipes.len(),
            "Content packs loaded"
        );
        Ok(Self {
            items,
            recipes,
            perks,
            store,
        })
    }

    /// Small default content used when no directory is configured.
    pub fn builtin() -> Result<Self, CatalogError> {
        let items = ItemCatalog::new()
            .with(ItemDefinition::stackable("iron_ore", "Iron Ore").with_value(5))?
            .with(ItemDefinition::stackable("coal", "Coal").with_value(2))?
            .with(ItemDefinition::stackable("iron_bar", "Iron Bar").with_value(15))?
            .with(ItemDefinition::stackable("health_potion", "Health Potion").with_max_stack(20))?
            .with(
                ItemDefinition::instance("iron_sword", "Iron Sword")
                    .with_max_stack(5)
                    .with_value(120),
            )?;

        let mut recipes = RecipeBook::new();
        recipes.insert(
            Recipe {
                id: "smelt_iron".into(),
                inputs: vec![ItemAmount::new("iron_ore", 2), ItemAmount::new("coal", 1)],
                outputs: vec![ItemAmount::new("iron_bar", 1)],
                currency_cost: 5,
                enabled: true,
            },
            &items,
        )?;
        recipes.insert(
            Recipe {
                id: "forge_iron_sword".into(),
                inputs: vec![ItemAmount::new("iron_bar", 3)],
                outputs: vec![ItemAmount::new("iron_sword", 1)],
                currency_cost: 25,
                enabled: true,
            },
            &items,
        )?;

        let mut perks = PerkCatalog::new();
        perks.insert(PerkDefinition {
            id: "double_daily".into(),
            name: "Double Daily".into(),
            cost: 500,
            item_id: "perk_double_daily".into(),
            enabled: true,
        })?;

        let mut store = StoreCatalog::new();
        store.insert(StoreListing::new("health_potion", 30, 10), &items)?;
        store.insert(StoreListing::new("iron_ore", 8, 4).with_stock(500), &items)?;
        store.insert(
            StoreListing::new("iron_sword", 400, 100).with_purchase_limit(1),
            &items,
        )?;

        Ok(Self {
            items,
            recipes,
            perks,
            store,
        })
    }
}
