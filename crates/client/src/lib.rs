//! Headless console client.
//!
//! The binary loads content, then plays a short scripted tour of the start
//! map: the [`Tour`] moves the player and presses buttons, the
//! [`Autopilot`] answers battle menus and dialogs, and the [`ConsoleHost`]
//! prints everything the game shows.

mod host;
mod tour;

pub use host::ConsoleHost;
pub use tour::{Tour, TourStep};

use anyhow::{Result, anyhow};
use monster_core::entity::AiKind;
use monster_runtime::{Autopilot, RuntimeConfig, Session, bootstrap};

/// Client container: the session and the drivers around it.
pub struct Client {
    config: RuntimeConfig,
    session: Session,
    autopilot: Autopilot,
    host: ConsoleHost,
}

impl Client {
    /// Loads content and enters the start map.
    pub fn new(mut config: RuntimeConfig) -> Result<Self> {
        let session = bootstrap(&mut config)
            .map_err(|e| anyhow!("Failed to start session: {}", e))?;
        let autopilot = Autopilot::new(AiKind::Simple, config.seed.unwrap_or_default());
        Ok(Self {
            config,
            session,
            autopilot,
            host: ConsoleHost::default(),
        })
    }

    /// Plays every step of `tour`, then reports the player's state.
    pub fn run(&mut self, tour: &Tour) -> Result<()> {
        let dt = self.config.tick_seconds();
        for step in tour.steps() {
            tracing::debug!(?step, "tour step");
            step.apply(&mut self.session, &mut self.host)?;
            let ticks = self.autopilot.run_until(
                &mut self.session,
                &mut self.host,
                dt,
                self.config.max_ticks,
                |session| {
                    !session.in_combat()
                        && session.awaited_button().is_none()
                        && !session.world().is_moving()
                },
            )?;
            if ticks == self.config.max_ticks {
                tracing::warn!(?step, ticks, "step did not settle");
            }
        }
        self.report();
        Ok(())
    }

    fn report(&self) {
        let Some(player) = self.session.player() else {
            return;
        };
        tracing::info!(
            ticks = self.session.ticks(),
            tile = %player.tile(),
            money = player.money,
            "tour finished"
        );
        for monster in player.party.monsters() {
            println!(
                "{} lv{} {}/{} hp",
                monster.slug,
                monster.level,
                monster.current_hp,
                monster.hp()
            );
        }
        if let Some(outcome) = self.session.last_outcome() {
            println!("last battle: {}", outcome.result);
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
