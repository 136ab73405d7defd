//! Where the game keeps its files.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::constants::{DATA_DIR_ENV, ITEMS_FILE_NAME, QUESTS_FILE_NAME, SAVE_DIR_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub data_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl GameConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let save_dir = data_dir.join(SAVE_DIR_NAME);
        Self { data_dir, save_dir }
    }

    /// Resolves the data directory: an explicit `--data-dir`, then
    /// `QUEST_CHRONICLES_DIR`, then the platform data directory.
    pub fn resolve(cli_data_dir: Option<PathBuf>) -> io::Result<Self> {
        Self::from_sources(cli_data_dir, env::var_os(DATA_DIR_ENV))
    }

    fn from_sources(cli: Option<PathBuf>, env_value: Option<OsString>) -> io::Result<Self> {
        if let Some(dir) = cli {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = env_value.filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }

        let project_dirs = ProjectDirs::from("", "", "quest-chronicles").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(Self::new(project_dirs.data_dir()))
    }

    pub fn quests_file(&self) -> PathBuf {
        self.data_dir.join(QUESTS_FILE_NAME)
    }

    pub fn items_file(&self) -> PathBuf {
        self.data_dir.join(ITEMS_FILE_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
