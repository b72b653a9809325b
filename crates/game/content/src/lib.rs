//! Data-driven content definitions and loaders.
//!
//! This crate reads game data files into the types `monster-core` consumes:
//! - Monster, technique, item, status and environment catalogs (RON)
//! - Localized message templates (RON)
//! - Maps with collision, NPC placement and scripted events (RON)
//! - Game configuration (TOML)
//!
//! Loaded content is handed to the engines once at startup and never mutated.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, ConfigLoader, ContentFactory, LocaleLoader, MapData, MapLoader, NpcSpawn,
    PartyMember,
};
