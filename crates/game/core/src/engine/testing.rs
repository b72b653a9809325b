//! Fixtures shared by the engine tests.

use std::sync::Arc;

use super::{Combat, CombatHost, CombatType};
use crate::config::{CombatTiming, GameConfig};
use crate::entity::Npc;
use crate::env::{ContentCatalog, Localizer, RngOracle};
use crate::monster::{Monster, TechEffect, Technique};
use crate::state::{EntityId, MonsterId, Position};

pub const DT: f32 = 0.1;
const MAX_TICKS: usize = 500;

pub fn tackle() -> Technique {
    Technique::new("tackle")
        .with_power(1.0)
        .with_effects(vec![TechEffect::Damage])
}

pub fn monster(id: u32, slug: &str) -> Monster {
    Monster::new(MonsterId(id), slug, 5).with_moves([tackle()])
}

pub fn player_with(monsters: impl IntoIterator<Item = Monster>) -> Npc {
    let mut player = Npc::player("Red", Position::ORIGIN);
    for monster in monsters {
        player.add_monster(monster);
    }
    player
}

pub fn trainer_with(id: EntityId, monsters: impl IntoIterator<Item = Monster>) -> Npc {
    let mut trainer = Npc::new(id, "rival", Position::new(3, 0));
    for monster in monsters {
        trainer.add_monster(monster);
    }
    trainer
}

pub fn wild_with(monster: Monster) -> Npc {
    Npc::wild(EntityId(99), monster)
}

pub fn test_config() -> GameConfig {
    GameConfig {
        combat: CombatTiming::instant(),
        ..GameConfig::default()
    }
}

pub fn start(participants: Vec<Npc>, combat_type: CombatType, catalog: ContentCatalog) -> Combat {
    start_with(&test_config(), participants, combat_type, catalog)
}

pub fn start_with(
    config: &GameConfig,
    participants: Vec<Npc>,
    combat_type: CombatType,
    catalog: ContentCatalog,
) -> Combat {
    Combat::new(
        participants,
        combat_type,
        "grass",
        config,
        Arc::new(catalog),
        Arc::new(Localizer::new(Localizer::DEFAULT_LOCALE)),
    )
    .expect("legal combat")
}

pub fn wild_combat() -> Combat {
    start(
        vec![
            player_with([monster(1, "rockitten")]),
            wild_with(monster(2, "bamboon")),
        ],
        CombatType::Wild,
        ContentCatalog::new(),
    )
}

pub fn trainer_combat(player: Npc, trainer: Npc) -> Combat {
    start(vec![player, trainer], CombatType::Trainer, ContentCatalog::new())
}

/// Trainer battle with two monsters per side on the battlefield.
pub fn double_combat(player: Npc, trainer: Npc) -> Combat {
    start_with(
        &test_config().with_battle_positions(2),
        vec![player, trainer],
        CombatType::Trainer,
        ContentCatalog::new(),
    )
}

/// Ticks until `done` holds; false when it never does.
pub fn run_until(
    combat: &mut Combat,
    host: &mut dyn CombatHost,
    rng: &mut dyn RngOracle,
    mut done: impl FnMut(&Combat) -> bool,
) -> bool {
    for _ in 0..MAX_TICKS {
        if done(combat) {
            return true;
        }
        combat.update(DT, host, rng).expect("combat update");
    }
    done(combat)
}
