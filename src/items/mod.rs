//! Item system: definitions, the item catalog, inventory and shop.

pub mod inventory;
pub mod types;

pub use inventory::*;
pub use types::*;
