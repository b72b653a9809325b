//! Deterministic monster-RPG rules shared by the runtime and tools.
//!
//! `monster-core` holds the grid and collision model, the pathfinder and
//! movement controller, the monster data model with its combat formulas,
//! the phase-driven combat engine and the map event engine. Nothing here
//! draws, sleeps or reads files: hosts drive it one tick at a time and
//! receive visual requests through the [`engine::CombatHost`] and
//! [`event::EventHost`] traits.
pub mod config;
pub mod engine;
pub mod entity;
pub mod env;
pub mod error;
pub mod event;
pub mod formula;
pub mod map;
pub mod monster;
pub mod state;
pub mod world;

pub use config::{CombatTiming, GameConfig};
pub use engine::{
    Combat, CombatError, CombatHost, CombatOutcome, CombatPhase, CombatResult, CombatType,
    Decision, DecisionError,
};
pub use entity::{Controller, MovementEvent, Mover, Npc, Party};
pub use env::{CatalogError, ContentCatalog, Localizer, PcgRng, RngOracle, ScriptedRng};
pub use error::{ErrorSeverity, GameError};
pub use event::{EventContext, EventEngine, EventHost, MapAction, MapEvent};
pub use formula::FormulaError;
pub use map::{CollisionMap, Path, find_path};
pub use monster::{Element, ItemDef, Monster, Status, Technique};
pub use state::{Direction, EntityId, MonsterId, Position, SeenStatus};
pub use world::{CombatRequest, Participant, World};
