//! Loads the quest and item catalogs, writing the built-in defaults the
//! first time the game runs.

use std::fs;
use std::path::Path;

use tracing::warn;

use super::config::GameConfig;
use crate::items::ItemCatalog;
use crate::quests::{CatalogError, QuestCatalog};

pub const DEFAULT_QUESTS: &str = "\
QUEST_ID: first_steps
TITLE: First Steps
DESCRIPTION: Defeat your first enemy outside the village
REWARD_XP: 50
REWARD_GOLD: 25
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

QUEST_ID: goblin_camp
TITLE: The Goblin Camp
DESCRIPTION: Drive the goblins away from the east road
REWARD_XP: 100
REWARD_GOLD: 50
REQUIRED_LEVEL: 2
PREREQUISITE: first_steps

QUEST_ID: herb_gathering
TITLE: Herb Gathering
DESCRIPTION: Collect healing herbs for the village healer
REWARD_XP: 40
REWARD_GOLD: 30
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

QUEST_ID: orc_warband
TITLE: The Orc Warband
DESCRIPTION: Break the warband camped in the hills
REWARD_XP: 250
REWARD_GOLD: 120
REQUIRED_LEVEL: 4
PREREQUISITE: goblin_camp

QUEST_ID: dragon_slayer
TITLE: Dragon Slayer
DESCRIPTION: Slay the dragon of the northern peaks
REWARD_XP: 1000
REWARD_GOLD: 500
REQUIRED_LEVEL: 6
PREREQUISITE: orc_warband
";

pub const DEFAULT_ITEMS: &str = "\
ITEM_ID: health_potion
NAME: Health Potion
TYPE: consumable
EFFECT: health:20
COST: 25
DESCRIPTION: Restores 20 health

ITEM_ID: greater_health_potion
NAME: Greater Health Potion
TYPE: consumable
EFFECT: health:60
COST: 60
DESCRIPTION: Restores 60 health

ITEM_ID: iron_sword
NAME: Iron Sword
TYPE: weapon
EFFECT: strength:5
COST: 80
DESCRIPTION: A plain but sturdy blade

ITEM_ID: oak_staff
NAME: Oak Staff
TYPE: weapon
EFFECT: magic:6
COST: 80
DESCRIPTION: Carved oak that hums with power

ITEM_ID: leather_armor
NAME: Leather Armor
TYPE: armor
EFFECT: max_health:10
COST: 60
DESCRIPTION: Light armor of boiled leather

ITEM_ID: chain_mail
NAME: Chain Mail
TYPE: armor
EFFECT: max_health:25
COST: 150
DESCRIPTION: Interlocking rings of steel
";

/// Both catalogs, loaded once per run.
#[derive(Debug, Clone)]
pub struct GameData {
    pub quests: QuestCatalog,
    pub items: ItemCatalog,
}

impl GameData {
    /// Loads both catalogs. Missing files are an error.
    pub fn load(config: &GameConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            quests: QuestCatalog::load(&config.quests_file())?,
            items: ItemCatalog::load(&config.items_file())?,
        })
    }

    /// Loads both catalogs, first writing defaults for any missing file.
    pub fn load_or_create(config: &GameConfig) -> Result<Self, CatalogError> {
        write_default_if_missing(&config.quests_file(), DEFAULT_QUESTS)?;
        write_default_if_missing(&config.items_file(), DEFAULT_ITEMS)?;
        Self::load(config)
    }

    /// The built-in catalogs, without touching the disk.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Self {
            quests: QuestCatalog::from_text(DEFAULT_QUESTS, "built-in quests")?,
            items: ItemCatalog::from_text(DEFAULT_ITEMS, "built-in items")?,
        })
    }
}

fn write_default_if_missing(path: &Path, contents: &str) -> Result<(), CatalogError> {
    if path.exists() {
        return Ok(());
    }
    let io_err = |source: std::io::Error| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    warn!(path = %path.display(), "catalog file missing, wrote defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_catalogs_are_valid() {
        let data = GameData::builtin().unwrap();
        assert_eq!(data.quests.len(), 5);
        assert_eq!(data.items.len(), 6);
        data.quests.validate().unwrap();
    }

    #[test]
    fn test_load_without_files_fails() {
        let dir = TempDir::new().unwrap();
        let config = GameConfig::new(dir.path());
        assert!(matches!(
            GameData::load(&config),
            Err(CatalogError::MissingFile(_))
        ));
    }

    #[test]
    fn test_load_or_create_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let config = GameConfig::new(dir.path().join("nested"));

        let data = GameData::load_or_create(&config).unwrap();
        assert!(config.quests_file().exists());
        assert!(config.items_file().exists());
        assert!(data.quests.contains("dragon_slayer"));

        // Edits survive the next start
        fs::write(
            config.items_file(),
            "ITEM_ID: rock\nNAME: Rock\nTYPE: weapon\nEFFECT: strength:1\nCOST: 1\n",
        )
        .unwrap();
        let data = GameData::load_or_create(&config).unwrap();
        assert_eq!(data.items.len(), 1);
    }

    #[test]
    fn test_invalid_catalog_reported() {
        let dir = TempDir::new().unwrap();
        let config = GameConfig::new(dir.path());
        fs::write(config.quests_file(), "QUEST_ID a\n").unwrap();
        fs::write(config.items_file(), DEFAULT_ITEMS).unwrap();
        assert!(matches!(
            GameData::load_or_create(&config),
            Err(CatalogError::InvalidFormat { .. })
        ));
    }
}
