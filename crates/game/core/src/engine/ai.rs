//! Decision models for AI-controlled combatants.

use crate::entity::AiKind;
use crate::env::RngOracle;
use crate::monster::{Monster, Technique};
use crate::state::MonsterId;

/// What an AI decided for one monster.
#[derive(Clone, Debug, PartialEq)]
pub enum AiChoice {
    Technique { technique: Technique, target: MonsterId },
    Run,
    /// Nothing usable; the monster skips its turn.
    Skip,
}

pub trait CombatAi {
    fn decide(&self, monster: &Monster, opponents: &[&Monster], rng: &mut dyn RngOracle)
    -> AiChoice;
}

/// First usable technique against the first opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleAi;

impl CombatAi for SimpleAi {
    fn decide(&self, monster: &Monster, opponents: &[&Monster], _: &mut dyn RngOracle) -> AiChoice {
        let (Some((_, technique)), Some(target)) =
            (monster.usable_moves().next(), opponents.first())
        else {
            return AiChoice::Skip;
        };
        AiChoice::Technique {
            technique: technique.clone(),
            target: target.id,
        }
    }
}

/// Random usable technique against a random opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomAi;

impl CombatAi for RandomAi {
    fn decide(
        &self,
        monster: &Monster,
        opponents: &[&Monster],
        rng: &mut dyn RngOracle,
    ) -> AiChoice {
        let usable: Vec<&Technique> = monster.usable_moves().map(|(_, tech)| tech).collect();
        let (Some(tech), Some(foe)) = (rng.pick(usable.len()), rng.pick(opponents.len())) else {
            return AiChoice::Skip;
        };
        AiChoice::Technique {
            technique: usable[tech].clone(),
            target: opponents[foe].id,
        }
    }
}

/// Park behaviour: flees when a roll falls under `distance`, idles otherwise.
#[derive(Clone, Copy, Debug)]
pub struct FleeAi {
    pub distance: f64,
}

impl FleeAi {
    pub const DEFAULT_DISTANCE: f64 = 0.5;
}

impl Default for FleeAi {
    fn default() -> Self {
        Self {
            distance: Self::DEFAULT_DISTANCE,
        }
    }
}

impl CombatAi for FleeAi {
    fn decide(&self, _: &Monster, _: &[&Monster], rng: &mut dyn RngOracle) -> AiChoice {
        if self.distance > rng.unit() {
            AiChoice::Run
        } else {
            AiChoice::Skip
        }
    }
}

/// Decision for `monster` under the model `kind`.
pub fn decide(
    kind: AiKind,
    monster: &Monster,
    opponents: &[&Monster],
    rng: &mut dyn RngOracle,
) -> AiChoice {
    match kind {
        AiKind::Simple => SimpleAi.decide(monster, opponents, rng),
        AiKind::Random => RandomAi.decide(monster, opponents, rng),
        AiKind::Flee => FleeAi::default().decide(monster, opponents, rng),
    }
}
