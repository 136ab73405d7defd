use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Character, CharacterClass};
use crate::core::constants::{MAX_NAME_LENGTH, SAVE_FILE_SUFFIX};
use crate::core::error::ErrorKind;
use crate::core::records::{join_list, parse_record, Record, RecordError};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No save file found for {0}")]
    CharacterNotFound(String),

    #[error("Could not access save file {path:?}: {source}")]
    SaveFileCorrupted {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Save file {path:?} has invalid data: {reason}")]
    InvalidSaveData { path: PathBuf, reason: String },

    #[error("Invalid character name: {0}")]
    InvalidName(String),
}

impl SaveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaveError::SaveFileCorrupted { .. } => ErrorKind::Io,
            SaveError::CharacterNotFound(_)
            | SaveError::InvalidSaveData { .. }
            | SaveError::InvalidName(_) => ErrorKind::Validation,
        }
    }
}

/// Summary of one save file, for the load menu.
#[derive(Debug, Clone)]
pub struct CharacterInfo {
    pub character_name: String,
    pub class: Option<CharacterClass>,
    pub level: u32,
    pub filename: String,
    pub last_save_time: i64,
    pub is_corrupted: bool,
}

/// Reads and writes one flat text file per character in `save_dir`.
pub struct CharacterManager {
    save_dir: PathBuf,
}

impl CharacterManager {
    pub fn new(save_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let save_dir = save_dir.into();
        fs::create_dir_all(&save_dir)?;
        Ok(Self { save_dir })
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn save_path(&self, character_name: &str) -> PathBuf {
        self.save_dir.join(save_filename(character_name))
    }

    /// Writes the character's save file, replacing any previous one.
    pub fn save_character(&self, character: &Character) -> Result<PathBuf, SaveError> {
        validate_name(&character.name).map_err(SaveError::InvalidName)?;

        let path = self.save_path(&character.name);
        let text = character_to_record(character).to_text();
        fs::write(&path, text).map_err(|source| SaveError::SaveFileCorrupted {
            path: path.clone(),
            source,
        })?;

        info!(name = %character.name, path = ?path, "character saved");
        Ok(path)
    }

    pub fn load_character(&self, character_name: &str) -> Result<Character, SaveError> {
        let path = self.save_path(character_name);
        if !path.exists() {
            return Err(SaveError::CharacterNotFound(character_name.to_string()));
        }
        let character = load_file(&path)?;
        debug!(name = %character.name, "character loaded");
        Ok(character)
    }

    /// Lists every save file, most recently saved first. Files that fail to
    /// load are included and marked corrupted.
    pub fn list_characters(&self) -> io::Result<Vec<CharacterInfo>> {
        let mut characters = Vec::new();

        for entry in fs::read_dir(&self.save_dir)? {
            let path = entry?.path();
            let filename = match path.file_name().and_then(|s| s.to_str()) {
                Some(name) if name.ends_with(SAVE_FILE_SUFFIX) => name.to_string(),
                _ => continue,
            };

            match load_file(&path) {
                Ok(character) => characters.push(CharacterInfo {
                    character_name: character.name,
                    class: Some(character.class),
                    level: character.level,
                    filename,
                    last_save_time: character.last_save_time,
                    is_corrupted: false,
                }),
                Err(e) => {
                    warn!(path = ?path, error = %e, "skipping unreadable save");
                    characters.push(CharacterInfo {
                        character_name: filename.trim_end_matches(SAVE_FILE_SUFFIX).to_string(),
                        class: None,
                        level: 0,
                        filename,
                        last_save_time: 0,
                        is_corrupted: true,
                    });
                }
            }
        }

        characters.sort_by(|a, b| b.last_save_time.cmp(&a.last_save_time));
        Ok(characters)
    }

    pub fn delete_character(&self, character_name: &str) -> Result<(), SaveError> {
        let path = self.save_path(character_name);
        if !path.exists() {
            return Err(SaveError::CharacterNotFound(character_name.to_string()));
        }
        fs::remove_file(&path).map_err(|source| SaveError::SaveFileCorrupted {
            path: path.clone(),
            source,
        })?;
        info!(name = character_name, "character deleted");
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<Character, SaveError> {
    let text = fs::read_to_string(path).map_err(|source| SaveError::SaveFileCorrupted {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |reason: String| SaveError::InvalidSaveData {
        path: path.to_path_buf(),
        reason,
    };

    let record = parse_record(&text).map_err(|e| invalid(e.to_string()))?;
    let character = character_from_record(&record).map_err(|e| invalid(e.to_string()))?;
    character.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(character)
}

fn character_to_record(c: &Character) -> Record {
    let mut record = Record::new();
    record.insert("NAME", c.name.as_str());
    record.insert("CLASS", c.class.name());
    record.insert("LEVEL", c.level.to_string());
    record.insert("HEALTH", c.health.to_string());
    record.insert("MAX_HEALTH", c.max_health.to_string());
    record.insert("STRENGTH", c.strength.to_string());
    record.insert("MAGIC", c.magic.to_string());
    record.insert("EXPERIENCE", c.experience.to_string());
    record.insert("GOLD", c.gold.to_string());
    record.insert("INVENTORY", join_list(&c.inventory));
    record.insert("ACTIVE_QUESTS", join_list(&c.active_quests));
    record.insert("COMPLETED_QUESTS", join_list(&c.completed_quests));
    record.insert("EQUIPPED_WEAPON", c.equipped_weapon.clone().unwrap_or_default());
    record.insert("EQUIPPED_ARMOR", c.equipped_armor.clone().unwrap_or_default());
    record.insert("LAST_SAVED", c.last_save_time.to_string());
    record
}

fn character_from_record(record: &Record) -> Result<Character, RecordError> {
    let class_name = record.require("CLASS")?;
    let class = class_name
        .parse::<CharacterClass>()
        .map_err(|_| RecordError::InvalidValue {
            key: "CLASS".to_string(),
            value: class_name.to_string(),
        })?;

    Ok(Character {
        name: record.require("NAME")?.to_string(),
        class,
        level: record.parse("LEVEL")?,
        health: record.parse("HEALTH")?,
        max_health: record.parse("MAX_HEALTH")?,
        strength: record.parse("STRENGTH")?,
        magic: record.parse("MAGIC")?,
        experience: record.parse("EXPERIENCE")?,
        gold: record.parse("GOLD")?,
        inventory: record.list("INVENTORY"),
        active_quests: record.list("ACTIVE_QUESTS"),
        completed_quests: record.list("COMPLETED_QUESTS"),
        equipped_weapon: record.optional("EQUIPPED_WEAPON"),
        equipped_armor: record.optional("EQUIPPED_ARMOR"),
        last_save_time: match record.optional("LAST_SAVED") {
            Some(_) => record.parse("LAST_SAVED")?,
            None => 0,
        },
    })
}

pub fn save_filename(character_name: &str) -> String {
    format!("{}{}", sanitize_name(character_name), SAVE_FILE_SUFFIX)
}

pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name must be {} characters or less",
            MAX_NAME_LENGTH
        ));
    }

    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');

    if !valid_chars {
        return Err(
            "Name can only contain letters, numbers, spaces, hyphens, and underscores".to_string(),
        );
    }

    Ok(())
}

pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
