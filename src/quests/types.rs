use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::NO_PREREQUISITE;
use crate::core::error::ErrorKind;

/// Why an otherwise known quest cannot be accepted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetRequirement {
    PrerequisiteIncomplete(String),
    AlreadyActive,
}

impl fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmetRequirement::PrerequisiteIncomplete(id) => {
                write!(f, "requires completing '{}' first", id)
            }
            UnmetRequirement::AlreadyActive => f.write_str("quest is already active"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("Quest '{0}' does not exist")]
    NotFound(String),

    #[error("Quest '{quest_id}' requires level {required} (currently {current})")]
    InsufficientLevel {
        quest_id: String,
        required: u32,
        current: u32,
    },

    #[error("Cannot accept quest '{quest_id}': {reason}")]
    RequirementsNotMet {
        quest_id: String,
        reason: UnmetRequirement,
    },

    #[error("Quest '{0}' is already completed")]
    AlreadyCompleted(String),

    #[error("Quest '{0}' is not active")]
    NotActive(String),

    #[error("Quest catalog is corrupt: {0}")]
    CorruptCatalog(String),
}

impl QuestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuestError::NotFound(_) | QuestError::CorruptCatalog(_) => ErrorKind::Validation,
            QuestError::InsufficientLevel { .. }
            | QuestError::RequirementsNotMet { .. }
            | QuestError::AlreadyCompleted(_)
            | QuestError::NotActive(_) => ErrorKind::Precondition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Prerequisite {
    #[default]
    None,
    Quest(String),
}

impl Prerequisite {
    /// Reads the catalog form, where `NONE` (any case) or an empty value
    /// means no prerequisite.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(NO_PREREQUISITE) {
            Prerequisite::None
        } else {
            Prerequisite::Quest(value.to_string())
        }
    }

    pub fn quest_id(&self) -> Option<&str> {
        match self {
            Prerequisite::None => None,
            Prerequisite::Quest(id) => Some(id),
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisite::None => f.write_str(NO_PREREQUISITE),
            Prerequisite::Quest(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub required_level: u32,
    pub prerequisite: Prerequisite,
    pub reward_xp: u32,
    pub reward_gold: u32,
}

impl Quest {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            required_level: 1,
            prerequisite: Prerequisite::None,
            reward_xp: 0,
            reward_gold: 0,
        }
    }

    pub fn with_level(mut self, required_level: u32) -> Self {
        self.required_level = required_level.max(1);
        self
    }

    pub fn with_prerequisite(mut self, quest_id: impl Into<String>) -> Self {
        self.prerequisite = Prerequisite::Quest(quest_id.into());
        self
    }

    pub fn with_rewards(mut self, xp: u32, gold: u32) -> Self {
        self.reward_xp = xp;
        self.reward_gold = gold;
        self
    }
}

/// Rewards owed for a completed quest. Completing a quest hands this back;
/// the caller decides how to apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestReward {
    pub quest_id: String,
    pub title: String,
    pub xp: u32,
    pub gold: u32,
}

impl From<&Quest> for QuestReward {
    fn from(quest: &Quest) -> Self {
        Self {
            quest_id: quest.id.clone(),
            title: quest.title.clone(),
            xp: quest.reward_xp,
            gold: quest.reward_gold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardTotals {
    pub xp: u64,
    pub gold: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisite_parse() {
        assert_eq!(Prerequisite::parse("NONE"), Prerequisite::None);
        assert_eq!(Prerequisite::parse("none"), Prerequisite::None);
        assert_eq!(Prerequisite::parse("  "), Prerequisite::None);
        assert_eq!(
            Prerequisite::parse(" first_steps "),
            Prerequisite::Quest("first_steps".to_string())
        );
        assert_eq!(Prerequisite::None.to_string(), "NONE");
    }

    #[test]
    fn test_quest_builder_clamps_level() {
        let quest = Quest::new("q", "Q").with_level(0).with_rewards(10, 5);
        assert_eq!(quest.required_level, 1);
        assert_eq!(quest.reward_xp, 10);
        assert_eq!(quest.prerequisite.quest_id(), None);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            QuestError::NotFound("x".to_string()).kind(),
            ErrorKind::Validation
        );
        let err = QuestError::RequirementsNotMet {
            quest_id: "b".to_string(),
            reason: UnmetRequirement::PrerequisiteIncomplete("a".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(
            err.to_string(),
            "Cannot accept quest 'b': requires completing 'a' first"
        );
    }
}
