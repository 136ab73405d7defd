//! Shared game plumbing: constants, errors, config, file records, catalog
//! loading and the play session.

pub mod config;
pub mod constants;
pub mod error;
pub mod game_data;
pub mod records;
pub mod session;

pub use config::GameConfig;
pub use error::{ErrorKind, GameError};
pub use game_data::GameData;
pub use session::*;
