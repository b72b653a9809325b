//! Shared state primitives.
//!
//! Identifiers, grid coordinates and the small per-NPC records (variables,
//! inventory, species index) that scripts and combat both read and write.
pub mod common;
pub mod records;

pub use common::{Direction, DirectionSet, EntityId, MonsterId, Position};
pub use records::{GameVariables, Inventory, SeenStatus, Tuxepedia};
