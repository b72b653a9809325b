//! Headless driver that answers every prompt a session raises.
//!
//! Menus are answered with the combat AI, result prompts are acknowledged and
//! event dialogs are dismissed. Used by the binary for unattended runs and by
//! the integration tests.
use tracing::debug;

use monster_core::engine::{AiChoice, Combat, CombatType, decide};
use monster_core::entity::AiKind;
use monster_core::event::Button;
use monster_core::{ContentCatalog, Decision, EntityId, Monster, MonsterId};

use crate::error::Result;
use crate::rng::StdRngOracle;
use crate::session::{GameHost, Session};

/// What the autopilot did on one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intervention {
    Acknowledged,
    Decided(Decision),
    Replaced(MonsterId),
    DismissedDialog,
}

pub struct Autopilot {
    ai: AiKind,
    rng: StdRngOracle,
}

impl Autopilot {
    pub fn new(ai: AiKind, seed: u64) -> Self {
        Self {
            ai,
            rng: StdRngOracle::seeded(seed),
        }
    }

    /// Answers whatever the session is waiting on, if anything.
    pub fn step<H: GameHost>(
        &mut self,
        session: &mut Session,
        host: &mut H,
    ) -> Result<Option<Intervention>> {
        if session.in_combat() {
            return self.step_combat(session, host);
        }
        if let Some(button) = session.awaited_button() {
            session.release(button);
            return Ok(Some(Intervention::DismissedDialog));
        }
        Ok(None)
    }

    fn step_combat<H: GameHost>(
        &mut self,
        session: &mut Session,
        host: &mut H,
    ) -> Result<Option<Intervention>> {
        let Some(combat) = session.combat() else {
            return Ok(None);
        };

        if combat.is_waiting_for_input() {
            session.press(Button::A, host);
            return Ok(Some(Intervention::Acknowledged));
        }

        if combat.pending_replacements().contains(&EntityId::PLAYER) {
            let replacement = combat.player_side().and_then(|side| {
                side.npc
                    .party
                    .awake_monsters()
                    .find(|monster| !side.in_play.contains(&monster.id))
                    .map(|monster| monster.id)
            });
            if let Some(monster) = replacement {
                session.submit_replacement(host, EntityId::PLAYER, monster)?;
                return Ok(Some(Intervention::Replaced(monster)));
            }
        }

        let Some(monster_id) = combat.awaiting() else {
            return Ok(None);
        };
        let Some(monster) = combat.monster(monster_id) else {
            return Ok(None);
        };
        let opponents = combat.opponents(monster_id);
        let decision = if combat.combat_type() == CombatType::Park {
            park_decision(combat, session.catalog(), monster_id, &opponents)
        } else {
            match decide(self.ai, monster, &opponents, &mut self.rng) {
                AiChoice::Technique { technique, target } => Decision::Technique {
                    monster: monster_id,
                    technique: technique.slug,
                    target,
                },
                AiChoice::Run | AiChoice::Skip if combat.combat_type() == CombatType::Trainer => {
                    Decision::Forfeit {
                        monster: monster_id,
                    }
                }
                AiChoice::Run | AiChoice::Skip => Decision::Run {
                    monster: monster_id,
                },
            }
        };
        debug!(?decision, "autopilot decision");
        session.submit_decision(host, decision.clone())?;
        Ok(Some(Intervention::Decided(decision)))
    }

    /// Ticks the session, answering prompts, until `done` holds or
    /// `max_ticks` have passed. Returns the number of ticks run.
    pub fn run_until<H: GameHost>(
        &mut self,
        session: &mut Session,
        host: &mut H,
        dt: f32,
        max_ticks: u64,
        mut done: impl FnMut(&Session) -> bool,
    ) -> Result<u64> {
        for tick in 0..max_ticks {
            if done(session) {
                return Ok(tick);
            }
            session.tick(dt, host)?;
            self.step(session, host)?;
        }
        Ok(max_ticks)
    }
}

/// Throws the first capture device the trainer carries, or runs.
fn park_decision(
    combat: &Combat,
    catalog: &ContentCatalog,
    monster: MonsterId,
    opponents: &[&Monster],
) -> Decision {
    let ball = combat.side_of_monster(monster).and_then(|side| {
        side.npc
            .inventory
            .iter()
            .filter(|(_, quantity)| *quantity > 0)
            .find(|(slug, _)| {
                catalog
                    .item(slug)
                    .is_ok_and(|item| item.is_capture_device())
            })
            .map(|(slug, _)| slug.to_owned())
    });
    match (ball, opponents.first()) {
        (Some(item), Some(target)) => Decision::Item {
            monster,
            item,
            target: target.id,
        },
        _ => Decision::Run { monster },
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(AiKind::Simple, 0)
    }
}
