use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::*;
use crate::core::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("Invalid class: {0}")]
    InvalidClass(String),

    #[error("{0} is dead")]
    Dead(String),

    #[error("Not enough gold: have {have}, need {need}")]
    InsufficientGold { have: u32, need: u32 },

    #[error("Invalid character data: {0}")]
    InvalidData(String),
}

impl CharacterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CharacterError::InvalidClass(_) | CharacterError::InvalidData(_) => {
                ErrorKind::Validation
            }
            CharacterError::Dead(_) => ErrorKind::Precondition,
            CharacterError::InsufficientGold { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

impl CharacterClass {
    pub fn all() -> [CharacterClass; 4] {
        [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Cleric,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Cleric => "Cleric",
        }
    }

    /// (health, strength, magic) at level 1.
    pub fn base_stats(&self) -> (u32, u32, u32) {
        match self {
            CharacterClass::Warrior => WARRIOR_BASE_STATS,
            CharacterClass::Mage => MAGE_BASE_STATS,
            CharacterClass::Rogue => ROGUE_BASE_STATS,
            CharacterClass::Cleric => CLERIC_BASE_STATS,
        }
    }

    pub fn ability_name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Power Strike",
            CharacterClass::Mage => "Fireball",
            CharacterClass::Rogue => "Critical Strike",
            CharacterClass::Cleric => "Heal",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharacterClass {
    type Err = CharacterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CharacterClass::all()
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CharacterError::InvalidClass(trimmed.to_string()))
    }
}

/// The player's character: combat stats, wallet, inventory and quest log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub strength: u32,
    pub magic: u32,
    pub experience: u64,
    pub gold: u32,
    pub inventory: Vec<String>,
    pub active_quests: Vec<String>,
    pub completed_quests: Vec<String>,
    #[serde(default)]
    pub equipped_weapon: Option<String>,
    #[serde(default)]
    pub equipped_armor: Option<String>,
    #[serde(default)]
    pub last_save_time: i64,
}

impl Character {
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        let (health, strength, magic) = class.base_stats();
        Self {
            name: name.into(),
            class,
            level: STARTING_LEVEL,
            health,
            max_health: health,
            strength,
            magic,
            experience: 0,
            gold: STARTING_GOLD,
            inventory: Vec::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            last_save_time: 0,
        }
    }

    /// Checks the invariants every loaded or constructed record must hold.
    pub fn validate(&self) -> Result<(), CharacterError> {
        if self.name.trim().is_empty() {
            return Err(CharacterError::InvalidData("name is empty".to_string()));
        }
        if self.level < 1 {
            return Err(CharacterError::InvalidData("level must be at least 1".to_string()));
        }
        if self.health > self.max_health {
            return Err(CharacterError::InvalidData(format!(
                "health {} exceeds max_health {}",
                self.health, self.max_health
            )));
        }
        if let Some(dup) = first_duplicate(&self.active_quests) {
            return Err(CharacterError::InvalidData(format!(
                "quest '{}' is active twice",
                dup
            )));
        }
        if let Some(dup) = first_duplicate(&self.completed_quests) {
            return Err(CharacterError::InvalidData(format!(
                "quest '{}' is completed twice",
                dup
            )));
        }
        if let Some(both) = self
            .active_quests
            .iter()
            .find(|id| self.completed_quests.contains(*id))
        {
            return Err(CharacterError::InvalidData(format!(
                "quest '{}' is both active and completed",
                both
            )));
        }
        Ok(())
    }
}

fn first_duplicate(ids: &[String]) -> Option<&String> {
    ids.iter()
        .enumerate()
        .find(|&(i, id)| ids[..i].contains(id))
        .map(|(_, id)| id)
}
