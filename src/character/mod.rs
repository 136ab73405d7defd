//! The player character: stats, progression, and save files.

pub mod manager;
pub mod progression;
pub mod types;

pub use manager::*;
pub use progression::*;
pub use types::*;
