//! Quest Chronicles - a text-menu RPG library.
//!
//! Game rules live here: the combat engine, the quest graph, characters
//! and their save files, items and the shop. The `quest-chronicles`
//! binary is a thin prompt loop over [`core::Session`].

pub mod build_info;
pub mod character;
pub mod combat;
pub mod core;
pub mod items;
pub mod quests;

pub use character::{Character, CharacterClass, CharacterManager};
pub use combat::{Battle, BattleResult, Enemy, EnemyKind, PlayerAction, Winner};
pub use crate::core::{GameConfig, GameData, GameError, Session};
pub use quests::{Quest, QuestCatalog};
