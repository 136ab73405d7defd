use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::error::ErrorKind;
use crate::core::records::{parse_records, Record, RecordError};
use crate::quests::{read_catalog_file, CatalogError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Inventory is full")]
    InventoryFull,

    #[error("Item '{0}' is not in the inventory")]
    ItemNotFound(String),

    #[error("Item '{0}' is not in the item catalog")]
    UnknownItem(String),

    #[error("Item '{item_id}' is not a {expected}")]
    InvalidItemType { item_id: String, expected: ItemKind },

    #[error("Not enough gold: have {have}, need {need}")]
    InsufficientGold { have: u32, need: u32 },

    #[error("Invalid item effect '{0}', expected 'stat:value'")]
    InvalidEffect(String),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::InventoryFull | InventoryError::InsufficientGold { .. } => {
                ErrorKind::ResourceExhausted
            }
            InventoryError::ItemNotFound(_)
            | InventoryError::UnknownItem(_)
            | InventoryError::InvalidItemType { .. }
            | InventoryError::InvalidEffect(_) => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
}

impl ItemKind {
    pub fn key(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
            ItemKind::Consumable => "consumable",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ItemKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(ItemKind::Weapon),
            "armor" => Ok(ItemKind::Armor),
            "consumable" => Ok(ItemKind::Consumable),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Health,
    MaxHealth,
    Strength,
    Magic,
}

impl Stat {
    pub fn key(&self) -> &'static str {
        match self {
            Stat::Health => "health",
            Stat::MaxHealth => "max_health",
            Stat::Strength => "strength",
            Stat::Magic => "magic",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A flat bonus to one stat, written `stat:value` in the item file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEffect {
    pub stat: Stat,
    pub value: u32,
}

impl fmt::Display for StatEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stat, self.value)
    }
}

impl FromStr for StatEffect {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InventoryError::InvalidEffect(s.to_string());
        let (stat, value) = s.split_once(':').ok_or_else(invalid)?;
        let stat = match stat.trim().to_lowercase().as_str() {
            "health" => Stat::Health,
            "max_health" => Stat::MaxHealth,
            "strength" => Stat::Strength,
            "magic" => Stat::Magic,
            _ => return Err(invalid()),
        };
        let value = value.trim().parse().map_err(|_| invalid())?;
        Ok(StatEffect { stat, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub effect: StatEffect,
    pub cost: u32,
    pub description: String,
}

impl Item {
    pub fn sell_price(&self) -> u32 {
        self.cost / crate::core::constants::SELL_PRICE_DIVISOR
    }
}

/// Every item the shop and inventory know about, in file order.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self, CatalogError> {
        let items: Vec<Item> = items.into_iter().collect();
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        Ok(Self { items, index })
    }

    pub fn from_text(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let records = parse_records(text).map_err(|e| CatalogError::invalid(origin, e))?;
        let items = records
            .iter()
            .map(|r| item_from_record(r).map_err(|e| CatalogError::invalid(origin, e)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_items(items)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = read_catalog_file(path)?;
        let catalog = Self::from_text(&text, &path.display().to_string())?;
        info!(path = %path.display(), items = catalog.len(), "loaded item catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn to_text(&self) -> String {
        self.items
            .iter()
            .map(|item| item_to_record(item).to_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn item_from_record(record: &Record) -> Result<Item, RecordError> {
    let bad = |key: &str, value: &str| RecordError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    let kind_text = record.require("TYPE")?;
    let kind = kind_text.parse().map_err(|_| bad("TYPE", kind_text))?;
    let effect_text = record.require("EFFECT")?;
    let effect = effect_text.parse().map_err(|_| bad("EFFECT", effect_text))?;

    Ok(Item {
        id: record.require("ITEM_ID")?.to_string(),
        name: record.require("NAME")?.to_string(),
        kind,
        effect,
        cost: record.parse("COST")?,
        description: record.get("DESCRIPTION").unwrap_or_default().to_string(),
    })
}

fn item_to_record(item: &Item) -> Record {
    let mut record = Record::new();
    record.insert("ITEM_ID", item.id.as_str());
    record.insert("NAME", item.name.as_str());
    record.insert("TYPE", item.kind.key());
    record.insert("EFFECT", item.effect.to_string());
    record.insert("COST", item.cost.to_string());
    record.insert("DESCRIPTION", item.description.as_str());
    record
}
