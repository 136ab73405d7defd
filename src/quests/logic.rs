//! Quest acceptance, completion and progress queries.
//!
//! All mutating operations check every precondition before touching the
//! character, so a failed call leaves it unchanged.

use tracing::debug;

use super::catalog::QuestCatalog;
use super::types::{Quest, QuestError, QuestReward, RewardTotals, UnmetRequirement};
use crate::character::Character;

fn lookup<'c>(catalog: &'c QuestCatalog, quest_id: &str) -> Result<&'c Quest, QuestError> {
    catalog
        .get(quest_id)
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
}

pub fn is_quest_active(character: &Character, quest_id: &str) -> bool {
    character.active_quests.iter().any(|id| id == quest_id)
}

pub fn is_quest_completed(character: &Character, quest_id: &str) -> bool {
    character.completed_quests.iter().any(|id| id == quest_id)
}

fn prerequisite_met(character: &Character, quest: &Quest) -> bool {
    quest
        .prerequisite
        .quest_id()
        .map_or(true, |prereq| is_quest_completed(character, prereq))
}

fn check_acceptable(
    character: &Character,
    quest_id: &str,
    catalog: &QuestCatalog,
) -> Result<(), QuestError> {
    let quest = lookup(catalog, quest_id)?;

    if character.level < quest.required_level {
        return Err(QuestError::InsufficientLevel {
            quest_id: quest_id.to_string(),
            required: quest.required_level,
            current: character.level,
        });
    }

    if let Some(prereq) = quest.prerequisite.quest_id() {
        if !is_quest_completed(character, prereq) {
            return Err(QuestError::RequirementsNotMet {
                quest_id: quest_id.to_string(),
                reason: UnmetRequirement::PrerequisiteIncomplete(prereq.to_string()),
            });
        }
    }

    if is_quest_completed(character, quest_id) {
        return Err(QuestError::AlreadyCompleted(quest_id.to_string()));
    }

    if is_quest_active(character, quest_id) {
        return Err(QuestError::RequirementsNotMet {
            quest_id: quest_id.to_string(),
            reason: UnmetRequirement::AlreadyActive,
        });
    }

    Ok(())
}

/// Adds a quest to the character's active list.
///
/// Checks run in order: unknown id, level, prerequisite, already completed,
/// already active. The first failure is returned.
pub fn accept_quest(
    character: &mut Character,
    quest_id: &str,
    catalog: &QuestCatalog,
) -> Result<(), QuestError> {
    check_acceptable(character, quest_id, catalog)?;
    character.active_quests.push(quest_id.to_string());
    debug!(name = %character.name, quest = quest_id, "quest accepted");
    Ok(())
}

/// Whether [`accept_quest`] would succeed.
pub fn can_accept_quest(character: &Character, quest_id: &str, catalog: &QuestCatalog) -> bool {
    check_acceptable(character, quest_id, catalog).is_ok()
}

/// Moves an active quest to the completed list and returns its rewards.
/// Rewards are not applied here.
pub fn complete_quest(
    character: &mut Character,
    quest_id: &str,
    catalog: &QuestCatalog,
) -> Result<QuestReward, QuestError> {
    let quest = lookup(catalog, quest_id)?;
    let pos = character
        .active_quests
        .iter()
        .position(|id| id == quest_id)
        .ok_or_else(|| QuestError::NotActive(quest_id.to_string()))?;

    character.active_quests.remove(pos);
    character.completed_quests.push(quest_id.to_string());
    debug!(name = %character.name, quest = quest_id, "quest completed");
    Ok(QuestReward::from(quest))
}

/// Drops an active quest. It can be accepted again later.
pub fn abandon_quest(character: &mut Character, quest_id: &str) -> Result<(), QuestError> {
    let pos = character
        .active_quests
        .iter()
        .position(|id| id == quest_id)
        .ok_or_else(|| QuestError::NotActive(quest_id.to_string()))?;

    character.active_quests.remove(pos);
    debug!(name = %character.name, quest = quest_id, "quest abandoned");
    Ok(())
}

/// Quests the character could accept right now, in catalog order.
pub fn available_quests<'c>(character: &Character, catalog: &'c QuestCatalog) -> Vec<&'c Quest> {
    catalog
        .iter()
        .filter(|q| character.level >= q.required_level)
        .filter(|q| prerequisite_met(character, q))
        .filter(|q| !is_quest_completed(character, &q.id))
        .filter(|q| !is_quest_active(character, &q.id))
        .collect()
}

/// Full records for the character's active quests. Ids missing from the
/// catalog are skipped.
pub fn active_quests<'c>(character: &Character, catalog: &'c QuestCatalog) -> Vec<&'c Quest> {
    character
        .active_quests
        .iter()
        .filter_map(|id| catalog.get(id))
        .collect()
}

pub fn completed_quests<'c>(character: &Character, catalog: &'c QuestCatalog) -> Vec<&'c Quest> {
    character
        .completed_quests
        .iter()
        .filter_map(|id| catalog.get(id))
        .collect()
}

/// The prerequisite chain ending at `quest_id`, earliest ancestor first.
pub fn prerequisite_chain(quest_id: &str, catalog: &QuestCatalog) -> Result<Vec<String>, QuestError> {
    let mut chain = vec![quest_id.to_string()];
    let mut current = lookup(catalog, quest_id)?;

    while let Some(prereq) = current.prerequisite.quest_id() {
        if chain.len() > catalog.len() {
            return Err(QuestError::CorruptCatalog(format!(
                "prerequisite chain of '{}' does not terminate",
                quest_id
            )));
        }
        current = lookup(catalog, prereq)?;
        chain.push(prereq.to_string());
    }

    chain.reverse();
    Ok(chain)
}

/// Percentage of the catalog the character has completed. 0 for an empty
/// catalog.
pub fn completion_percentage(character: &Character, catalog: &QuestCatalog) -> f64 {
    if catalog.is_empty() {
        return 0.0;
    }
    character.completed_quests.len() as f64 / catalog.len() as f64 * 100.0
}

/// Sums rewards of completed quests that are still in the catalog.
pub fn total_rewards_earned(character: &Character, catalog: &QuestCatalog) -> RewardTotals {
    completed_quests(character, catalog)
        .into_iter()
        .fold(RewardTotals::default(), |acc, q| RewardTotals {
            xp: acc.xp + q.reward_xp as u64,
            gold: acc.gold + q.reward_gold as u64,
        })
}
