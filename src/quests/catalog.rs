//! The quest catalog: every quest definition, loaded once at startup.
//!
//! Definitions live in a blank-line separated `KEY: value` file:
//!
//! ```text
//! QUEST_ID: first_steps
//! TITLE: First Steps
//! DESCRIPTION: Defeat your first enemy
//! REWARD_XP: 50
//! REWARD_GOLD: 25
//! REQUIRED_LEVEL: 1
//! PREREQUISITE: NONE
//! ```
//!
//! A catalog loaded from disk is validated: ids are unique, every
//! prerequisite names a quest in the catalog, and no prerequisite chain loops
//! back on itself. [`QuestCatalog::from_quests`] skips validation so callers
//! can assemble catalogs in code and check them when ready.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::types::{Prerequisite, Quest};
use crate::core::error::ErrorKind;
use crate::core::records::{parse_records, Record, RecordError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid format in {origin}: {reason}")]
    InvalidFormat { origin: String, reason: String },

    #[error("Duplicate id '{0}' in catalog")]
    DuplicateId(String),

    #[error("Quest '{quest_id}' requires unknown quest '{prerequisite}'")]
    UnknownPrerequisite {
        quest_id: String,
        prerequisite: String,
    },

    #[error("Quest prerequisites loop back through '{0}'")]
    PrerequisiteCycle(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::MissingFile(_) | CatalogError::Io { .. } => ErrorKind::Io,
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn invalid(origin: &str, err: RecordError) -> Self {
        CatalogError::InvalidFormat {
            origin: origin.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Reads a catalog file, mapping a missing file to [`CatalogError::MissingFile`].
pub fn read_catalog_file(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CatalogError::MissingFile(path.to_path_buf())
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: Vec<Quest>,
    index: HashMap<String, usize>,
}

impl QuestCatalog {
    /// Builds a catalog without validating it. For duplicate ids, lookups
    /// resolve to the first definition.
    pub fn from_quests(quests: impl IntoIterator<Item = Quest>) -> Self {
        let quests: Vec<Quest> = quests.into_iter().collect();
        let mut index = HashMap::with_capacity(quests.len());
        for (i, quest) in quests.iter().enumerate() {
            index.entry(quest.id.clone()).or_insert(i);
        }
        Self { quests, index }
    }

    /// Parses and validates catalog text. `origin` names the source in
    /// error messages.
    pub fn from_text(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let records = parse_records(text).map_err(|e| CatalogError::invalid(origin, e))?;
        let quests = records
            .iter()
            .map(|record| quest_from_record(record).map_err(|e| CatalogError::invalid(origin, e)))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Self::from_quests(quests);
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = read_catalog_file(path)?;
        let catalog = Self::from_text(&text, &path.display().to_string())?;
        info!(path = %path.display(), quests = catalog.len(), "loaded quest catalog");
        Ok(catalog)
    }

    /// Checks id uniqueness, prerequisite references and acyclicity.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for quest in &self.quests {
            if !seen.insert(quest.id.as_str()) {
                return Err(CatalogError::DuplicateId(quest.id.clone()));
            }
        }

        for quest in &self.quests {
            if let Some(prereq) = quest.prerequisite.quest_id() {
                if !self.contains(prereq) {
                    return Err(CatalogError::UnknownPrerequisite {
                        quest_id: quest.id.clone(),
                        prerequisite: prereq.to_string(),
                    });
                }
            }
        }

        // Each quest has at most one prerequisite, so a walk longer than the
        // catalog must revisit a quest.
        for quest in &self.quests {
            let mut current = quest;
            let mut steps = 0;
            while let Some(prereq) = current.prerequisite.quest_id() {
                steps += 1;
                if steps > self.quests.len() || prereq == quest.id {
                    return Err(CatalogError::PrerequisiteCycle(quest.id.clone()));
                }
                match self.get(prereq) {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.index.get(id).map(|&i| &self.quests[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Quests in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter()
    }

    /// Quests whose required level is within `min_level..=max_level`.
    pub fn quests_by_level(&self, min_level: u32, max_level: u32) -> Vec<&Quest> {
        self.quests
            .iter()
            .filter(|q| (min_level..=max_level).contains(&q.required_level))
            .collect()
    }

    pub fn to_text(&self) -> String {
        self.quests
            .iter()
            .map(|q| quest_to_record(q).to_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn quest_from_record(record: &Record) -> Result<Quest, RecordError> {
    let required_level: u32 = record.parse("REQUIRED_LEVEL")?;
    if required_level == 0 {
        return Err(RecordError::InvalidValue {
            key: "REQUIRED_LEVEL".to_string(),
            value: "0".to_string(),
        });
    }

    let id = record.require("QUEST_ID")?;
    if id.is_empty() {
        return Err(RecordError::InvalidValue {
            key: "QUEST_ID".to_string(),
            value: String::new(),
        });
    }

    Ok(Quest {
        id: id.to_string(),
        title: record.require("TITLE")?.to_string(),
        description: record.get("DESCRIPTION").unwrap_or_default().to_string(),
        required_level,
        prerequisite: Prerequisite::parse(record.require("PREREQUISITE")?),
        reward_xp: record.parse("REWARD_XP")?,
        reward_gold: record.parse("REWARD_GOLD")?,
    })
}

fn quest_to_record(quest: &Quest) -> Record {
    let mut record = Record::new();
    record.insert("QUEST_ID", quest.id.as_str());
    record.insert("TITLE", quest.title.as_str());
    record.insert("DESCRIPTION", quest.description.as_str());
    record.insert("REWARD_XP", quest.reward_xp.to_string());
    record.insert("REWARD_GOLD", quest.reward_gold.to_string());
    record.insert("REQUIRED_LEVEL", quest.required_level.to_string());
    record.insert("PREREQUISITE", quest.prerequisite.to_string());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_QUESTS: &str = "\
QUEST_ID: first_steps
TITLE: First Steps
DESCRIPTION: Defeat your first enemy
REWARD_XP: 50
REWARD_GOLD: 25
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

QUEST_ID: goblin_hunt
TITLE: Goblin Hunt
DESCRIPTION: Clear the goblin camp
REWARD_XP: 120
REWARD_GOLD: 60
REQUIRED_LEVEL: 2
PREREQUISITE: first_steps
";

    #[test]
    fn test_from_text_keeps_file_order() {
        let catalog = QuestCatalog::from_text(TWO_QUESTS, "test").unwrap();
        let ids: Vec<&str> = catalog.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["first_steps", "goblin_hunt"]);

        let hunt = catalog.get("goblin_hunt").unwrap();
        assert_eq!(hunt.required_level, 2);
        assert_eq!(
            hunt.prerequisite,
            Prerequisite::Quest("first_steps".to_string())
        );
        assert_eq!(hunt.reward_gold, 60);
    }

    #[test]
    fn test_to_text_reloads_identically() {
        let catalog = QuestCatalog::from_text(TWO_QUESTS, "test").unwrap();
        let reloaded = QuestCatalog::from_text(&catalog.to_text(), "again").unwrap();
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            reloaded.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_field_is_invalid_format() {
        let text = "QUEST_ID: a\nTITLE: A\nREWARD_XP: 1\nREQUIRED_LEVEL: 1\nPREREQUISITE: NONE\n";
        let err = QuestCatalog::from_text(text, "quests.txt").unwrap_err();
        match err {
            CatalogError::InvalidFormat { origin, reason } => {
                assert_eq!(origin, "quests.txt");
                assert!(reason.contains("REWARD_GOLD"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_number_is_invalid_format() {
        let text = TWO_QUESTS.replace("REWARD_XP: 50", "REWARD_XP: lots");
        let err = QuestCatalog::from_text(&text, "test").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFormat { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let catalog = QuestCatalog::from_quests([Quest::new("a", "A"), Quest::new("a", "Again")]);
        assert_eq!(catalog.get("a").unwrap().title, "A");
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_unknown_prerequisite_rejected() {
        let catalog = QuestCatalog::from_quests([Quest::new("b", "B").with_prerequisite("a")]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::UnknownPrerequisite { quest_id, prerequisite })
                if quest_id == "b" && prerequisite == "a"
        ));
    }

    #[test]
    fn test_prerequisite_cycle_rejected() {
        let catalog = QuestCatalog::from_quests([
            Quest::new("a", "A").with_prerequisite("c"),
            Quest::new("b", "B").with_prerequisite("a"),
            Quest::new("c", "C").with_prerequisite("b"),
        ]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::PrerequisiteCycle(_))
        ));

        let self_loop = QuestCatalog::from_quests([Quest::new("a", "A").with_prerequisite("a")]);
        assert!(matches!(
            self_loop.validate(),
            Err(CatalogError::PrerequisiteCycle(id)) if id == "a"
        ));
    }

    #[test]
    fn test_quests_by_level_is_inclusive() {
        let catalog = QuestCatalog::from_quests([
            Quest::new("a", "A").with_level(1),
            Quest::new("b", "B").with_level(3),
            Quest::new("c", "C").with_level(5),
        ]);
        let ids: Vec<&str> = catalog
            .quests_by_level(3, 5)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = QuestCatalog::load(&dir.path().join("quests.txt")).unwrap_err();
        assert!(matches!(err, CatalogError::MissingFile(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quests.txt");
        fs::write(&path, TWO_QUESTS).unwrap();
        let catalog = QuestCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
    }
}
