use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::character::Character;
use crate::core::constants::*;
use crate::core::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("Character is dead and cannot fight")]
    CharacterDead,

    #[error("Combat is not active")]
    NotActive,

    #[error("Unknown enemy type: {0}")]
    UnknownEnemy(String),
}

impl CombatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CombatError::CharacterDead | CombatError::NotActive => ErrorKind::Precondition,
            CombatError::UnknownEnemy(_) => ErrorKind::Validation,
        }
    }
}

/// Anything that can stand on either side of a battle.
///
/// Implementors keep `health <= max_health`; every mutation goes through
/// [`Combatant::set_health`], which clamps.
pub trait Combatant {
    fn name(&self) -> &str;
    fn health(&self) -> u32;
    fn max_health(&self) -> u32;
    fn strength(&self) -> u32;
    fn magic(&self) -> u32;

    /// Sets health, clamped to `max_health`.
    fn set_health(&mut self, health: u32);

    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Reduces health, flooring at 0.
    fn take_damage(&mut self, amount: u32) {
        self.set_health(self.health().saturating_sub(amount));
    }

    /// Restores health up to max. Returns the amount actually restored.
    fn restore_health(&mut self, amount: u32) -> u32 {
        let before = self.health();
        self.set_health(before.saturating_add(amount));
        self.health() - before
    }
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn strength(&self) -> u32 {
        self.strength
    }

    fn magic(&self) -> u32 {
        self.magic
    }

    fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }
}

/// An enemy for a single encounter. Rewards are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    name: String,
    health: u32,
    max_health: u32,
    strength: u32,
    magic: u32,
    xp_reward: u32,
    gold_reward: u32,
}

impl Enemy {
    pub fn new(
        name: impl Into<String>,
        max_health: u32,
        strength: u32,
        magic: u32,
        xp_reward: u32,
        gold_reward: u32,
    ) -> Self {
        Self {
            name: name.into(),
            health: max_health,
            max_health,
            strength,
            magic,
            xp_reward,
            gold_reward,
        }
    }

    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    pub fn gold_reward(&self) -> u32 {
        self.gold_reward
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn strength(&self) -> u32 {
        self.strength
    }

    fn magic(&self) -> u32 {
        self.magic
    }

    fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Goblin,
    Orc,
    Dragon,
}

impl EnemyKind {
    pub fn all() -> [EnemyKind; 3] {
        [EnemyKind::Goblin, EnemyKind::Orc, EnemyKind::Dragon]
    }

    pub fn key(&self) -> &'static str {
        match self {
            EnemyKind::Goblin => "goblin",
            EnemyKind::Orc => "orc",
            EnemyKind::Dragon => "dragon",
        }
    }

    /// Picks the enemy tier for a character level.
    pub fn for_level(level: u32) -> Self {
        if level <= GOBLIN_MAX_LEVEL {
            EnemyKind::Goblin
        } else if level <= ORC_MAX_LEVEL {
            EnemyKind::Orc
        } else {
            EnemyKind::Dragon
        }
    }

    pub fn spawn(&self) -> Enemy {
        let (name, health, strength, magic, xp, gold) = match self {
            EnemyKind::Goblin => GOBLIN_STATS,
            EnemyKind::Orc => ORC_STATS,
            EnemyKind::Dragon => DRAGON_STATS,
        };
        Enemy::new(name, health, strength, magic, xp, gold)
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EnemyKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        EnemyKind::all()
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| CombatError::UnknownEnemy(s.trim().to_string()))
    }
}

/// Enemy factory keyed by type name (`goblin`, `orc`, `dragon`).
pub fn create_enemy(enemy_type: &str) -> Result<Enemy, CombatError> {
    Ok(enemy_type.parse::<EnemyKind>()?.spawn())
}

pub fn enemy_for_level(level: u32) -> Enemy {
    EnemyKind::for_level(level).spawn()
}

pub fn can_character_fight(character: &Character) -> bool {
    character.is_alive()
}
