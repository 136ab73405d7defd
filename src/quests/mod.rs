//! Quest definitions, the catalog, and the per-character quest graph.

pub mod catalog;
pub mod logic;
pub mod types;

pub use catalog::*;
pub use logic::*;
pub use types::*;
