//! Runtime orchestration for a monster-collecting RPG session.
//!
//! This crate wires the core simulation, loaded content and a random source
//! into a [`Session`] that hosts drive one tick at a time.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the overworld, the event engine and the active combat
//! - [`autopilot`] answers prompts for unattended runs
//! - [`config`] reads host settings from the environment
//! - [`rng`] adapts `rand` to the core random oracle
pub mod autopilot;
pub mod config;
pub mod error;
pub mod rng;
pub mod session;

use std::sync::Arc;

use monster_content::ContentFactory;
use monster_core::{Npc, Party, World};

pub use autopilot::{Autopilot, Intervention};
pub use config::RuntimeConfig;
pub use error::{Result, SessionError};
pub use rng::StdRngOracle;
pub use session::{GameHost, Session};

/// Loads content from `config.content_dir` and enters `config.start_map`
/// with a fresh player carrying the configured starter.
///
/// Game rules in `config.toml` replace `config.game_config`.
pub fn bootstrap(config: &mut RuntimeConfig) -> Result<Session> {
    let factory = ContentFactory::new(&config.content_dir);
    config.game_config = factory.load_config()?;
    let catalog = Arc::new(factory.load_catalog()?);
    let locale = Arc::new(factory.load_locale(&config.locale)?);
    let map = factory.load_map(&config.start_map)?;

    let mut world = World::new(
        &config.start_map,
        map.collision.clone(),
        Npc::player(&config.player_name, config.start_tile),
    );
    let id = world.allocate_monster_id();
    let starter = catalog.create_monster(&config.starter, config.starter_level, id)?;
    if let Some(player) = world.player_mut() {
        player.party = Party::new(config.game_config.party_limit);
        player.add_monster(starter);
    }

    let mut session = Session::new(
        world,
        catalog,
        locale,
        config.game_config.clone(),
        StdRngOracle::from_seed_option(config.seed),
    )?
    .with_debug_conditions(config.debug_conditions);
    session.enter_map(&config.start_map, &map)?;
    Ok(session)
}
