//! One play session: the loaded character, the catalogs and the rng.
//!
//! The menus drive everything through this type, so game rules live in the
//! library and the binary only reads input and prints.

use std::path::PathBuf;

use rand::Rng;
use tracing::info;

use super::constants::REVIVE_COST_GOLD;
use super::error::GameError;
use super::game_data::GameData;
use crate::character::{Character, CharacterError, CharacterManager};
use crate::combat::{
    ActionSource, Battle, BattleResult, CombatEvent, Combatant, EnemyKind, Winner,
};
use crate::items::{self, InventoryError, ItemKind, StatChange};
use crate::quests::{self, Quest, QuestReward, RewardTotals};

/// What happened on one trip outside town.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreOutcome {
    pub enemy: EnemyKind,
    pub enemy_name: String,
    pub result: BattleResult,
    pub log: Vec<CombatEvent>,
    pub levels_gained: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestCompletion {
    pub reward: QuestReward,
    pub levels_gained: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestProgress {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    pub rewards: RewardTotals,
}

pub struct Session<R: Rng> {
    character: Character,
    data: GameData,
    rng: R,
}

impl<R: Rng> Session<R> {
    pub fn new(character: Character, data: GameData, rng: R) -> Self {
        Self {
            character,
            data,
            rng,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// Fights the enemy matching the character's level. Victory pays out
    /// and applies any level-ups the experience buys.
    pub fn explore(&mut self, actions: &mut impl ActionSource) -> Result<ExploreOutcome, GameError> {
        let kind = EnemyKind::for_level(self.character.level);
        let mut enemy = kind.spawn();

        let mut battle = Battle::new(&mut self.character, &mut enemy);
        let result = battle.start(actions, &mut self.rng)?;
        let log = battle.log().to_vec();
        let enemy_name = enemy.name().to_string();

        let levels_gained = if result.winner == Winner::Player {
            self.character.apply_level_ups()
        } else {
            0
        };

        Ok(ExploreOutcome {
            enemy: kind,
            enemy_name,
            result,
            log,
            levels_gained,
        })
    }

    pub fn accept_quest(&mut self, quest_id: &str) -> Result<(), GameError> {
        quests::accept_quest(&mut self.character, quest_id, &self.data.quests)?;
        Ok(())
    }

    /// Completes an active quest and applies its rewards.
    pub fn complete_quest(&mut self, quest_id: &str) -> Result<QuestCompletion, GameError> {
        if self.character.is_dead() {
            return Err(CharacterError::Dead(self.character.name.clone()).into());
        }

        let reward = quests::complete_quest(&mut self.character, quest_id, &self.data.quests)?;
        let levels_gained = self.character.gain_experience(reward.xp as u64)?;
        self.character.add_gold(reward.gold as i64)?;

        info!(name = %self.character.name, quest = quest_id, xp = reward.xp, gold = reward.gold, "quest rewards applied");
        Ok(QuestCompletion {
            reward,
            levels_gained,
        })
    }

    pub fn abandon_quest(&mut self, quest_id: &str) -> Result<(), GameError> {
        quests::abandon_quest(&mut self.character, quest_id)?;
        Ok(())
    }

    pub fn available_quests(&self) -> Vec<&Quest> {
        quests::available_quests(&self.character, &self.data.quests)
    }

    pub fn active_quests(&self) -> Vec<&Quest> {
        quests::active_quests(&self.character, &self.data.quests)
    }

    pub fn quest_progress(&self) -> QuestProgress {
        let catalog = &self.data.quests;
        QuestProgress {
            active: self.character.active_quests.len(),
            completed: self.character.completed_quests.len(),
            total: catalog.len(),
            percentage: quests::completion_percentage(&self.character, catalog),
            rewards: quests::total_rewards_earned(&self.character, catalog),
        }
    }

    pub fn buy(&mut self, item_id: &str) -> Result<(), GameError> {
        items::purchase_item(&mut self.character, item_id, &self.data.items)?;
        Ok(())
    }

    pub fn sell(&mut self, item_id: &str) -> Result<u32, GameError> {
        Ok(items::sell_item(&mut self.character, item_id, &self.data.items)?)
    }

    pub fn use_item(&mut self, item_id: &str) -> Result<StatChange, GameError> {
        Ok(items::use_item(&mut self.character, item_id, &self.data.items)?)
    }

    /// Equips a held weapon or armor into its slot. Returns the item it
    /// replaced.
    pub fn equip(&mut self, item_id: &str) -> Result<Option<String>, GameError> {
        let kind = self
            .data
            .items
            .get(item_id)
            .map(|item| item.kind)
            .ok_or_else(|| InventoryError::UnknownItem(item_id.to_string()))?;

        let catalog = &self.data.items;
        let replaced = match kind {
            ItemKind::Weapon => items::equip_weapon(&mut self.character, item_id, catalog)?,
            ItemKind::Armor => items::equip_armor(&mut self.character, item_id, catalog)?,
            ItemKind::Consumable => {
                return Err(InventoryError::InvalidItemType {
                    item_id: item_id.to_string(),
                    expected: ItemKind::Weapon,
                }
                .into())
            }
        };
        Ok(replaced)
    }

    pub fn unequip_weapon(&mut self) -> Result<Option<String>, GameError> {
        Ok(items::unequip_weapon(&mut self.character, &self.data.items)?)
    }

    pub fn unequip_armor(&mut self) -> Result<Option<String>, GameError> {
        Ok(items::unequip_armor(&mut self.character, &self.data.items)?)
    }

    /// Pays the healer to bring a dead character back at half health.
    /// Returns false, spending nothing, if the character is alive.
    pub fn revive_for_gold(&mut self) -> Result<bool, GameError> {
        if !self.character.is_dead() {
            return Ok(false);
        }
        self.character.add_gold(-(REVIVE_COST_GOLD as i64))?;
        Ok(self.character.revive())
    }

    /// Stamps the save time and writes the character's save file.
    pub fn save(&mut self, manager: &CharacterManager) -> Result<PathBuf, GameError> {
        self.character.last_save_time = chrono::Utc::now().timestamp();
        Ok(manager.save_character(&self.character)?)
    }
}
