//! Actors living on the map: movement, parties and the NPC record itself.
pub mod movement;
pub mod npc;
pub mod party;

pub use movement::{Coord, MovementEvent, MovementState, Mover};
pub use npc::{AiKind, Controller, Npc};
pub use party::{EvolutionRecord, LevelSummary, Party, PartySlot};
