//! Error categories shared by every domain error, plus the aggregate
//! [`GameError`] used by the session and the binary.

use thiserror::Error;

use crate::character::{CharacterError, SaveError};
use crate::combat::CombatError;
use crate::items::InventoryError;
use crate::quests::{CatalogError, QuestError};

/// How a caller should treat a failure.
///
/// Validation and precondition failures are reported immediately and leave
/// state untouched. Resource exhaustion is recoverable by the player (earn
/// gold, free a slot). Io covers save and catalog files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    ResourceExhausted,
    Io,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Quest(#[from] QuestError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Combat(e) => e.kind(),
            GameError::Quest(e) => e.kind(),
            GameError::Catalog(e) => e.kind(),
            GameError::Character(e) => e.kind(),
            GameError::Inventory(e) => e.kind(),
            GameError::Save(e) => e.kind(),
            GameError::Io(_) => ErrorKind::Io,
        }
    }
}
