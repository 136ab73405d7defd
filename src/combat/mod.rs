//! Combat: enemies, damage math, class abilities and the battle loop.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
