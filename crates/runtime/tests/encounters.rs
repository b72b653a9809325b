//! Encounters started from hand-built worlds.

use std::sync::Arc;

use monster_content::MapLoader;
use monster_core::engine::{CombatResult, CombatType, RecordingHost};
use monster_core::monster::TechEffect;
use monster_core::world::Participant;
use monster_core::{
    CollisionMap, CombatTiming, ContentCatalog, Direction, EntityId, ErrorSeverity, GameConfig,
    GameError, ItemDef, Localizer, Monster, MonsterId, Npc, Position, Technique, World,
};
use monster_runtime::{Autopilot, Session, SessionError, StdRngOracle};

const DT: f32 = 0.1;
const MAX_TICKS: u64 = 2_000;

fn tackle() -> Technique {
    Technique::new("tackle")
        .with_power(1.0)
        .with_effects(vec![TechEffect::Damage])
}

fn monster(id: u32, slug: &str, level: u32) -> Monster {
    Monster::new(MonsterId(id), slug, level).with_moves([tackle()])
}

fn config() -> GameConfig {
    GameConfig {
        combat: CombatTiming::instant(),
        ..GameConfig::default()
    }
}

fn session_with(world: World, config: GameConfig) -> Result<Session, SessionError> {
    session_with_catalog(world, config, ContentCatalog::new())
}

fn session_with_catalog(
    world: World,
    config: GameConfig,
    catalog: ContentCatalog,
) -> Result<Session, SessionError> {
    Session::new(
        world,
        Arc::new(catalog),
        Arc::new(Localizer::new(Localizer::DEFAULT_LOCALE)),
        config,
        StdRngOracle::seeded(5),
    )
}

fn world_with_player(monsters: impl IntoIterator<Item = Monster>) -> World {
    let mut player = Npc::player("Red", Position::new(1, 1));
    for monster in monsters {
        player.add_monster(monster);
    }
    World::new("test", CollisionMap::with_bounds(10, 10), player)
}

#[test]
fn defeat_by_fainting_restores_the_party() {
    let mut world = world_with_player([monster(1, "rockitten", 2).with_hp(1)]);
    let mut rival = Npc::new(EntityId(3), "rival", Position::new(4, 1));
    rival.add_monster(monster(2, "bamboon", 30));
    let rival = world.add_npc(rival);
    world.enqueue_combat(
        vec![Participant::Npc(EntityId::PLAYER), Participant::Npc(rival)],
        CombatType::Trainer,
        "grass",
    );

    let mut session = session_with(world, config()).unwrap();
    let mut host = RecordingHost::new();
    let mut autopilot = Autopilot::default();
    session.tick(DT, &mut host).unwrap();
    assert!(session.in_combat());
    assert!(session.world().npc(rival).is_none());

    autopilot
        .run_until(&mut session, &mut host, DT, MAX_TICKS, |session| {
            !session.in_combat()
        })
        .unwrap();

    let outcome = session.last_outcome().expect("combat finished");
    assert_eq!(outcome.result, CombatResult::Lost);
    let player = session.player().expect("player back in the world");
    assert_eq!(player.variables.get("battle_lost_faint"), Some("true"));
    let starter = &player.party.monsters()[0];
    assert_eq!(starter.current_hp, starter.hp());
    assert!(session.world().npc(rival).is_some());
}

#[test]
fn park_battle_is_played_with_balls_only() {
    let mut world = world_with_player([monster(1, "rockitten", 5)]);
    if let Some(player) = world.player_mut() {
        player.inventory.add("tuxeball", 10);
    }
    let wild = Npc::wild(world.allocate_entity_id(), monster(2, "bamboon", 3));
    world.enqueue_combat(
        vec![
            Participant::Npc(EntityId::PLAYER),
            Participant::Wild(Box::new(wild)),
        ],
        CombatType::Park,
        "grass",
    );
    let mut catalog = ContentCatalog::new();
    catalog.insert_item(ItemDef::capture_device("tuxeball", 50.0));

    let mut session = session_with_catalog(world, config(), catalog).unwrap();
    let mut host = RecordingHost::new();
    let mut autopilot = Autopilot::default();
    session.tick(DT, &mut host).unwrap();
    assert!(session.in_combat());

    autopilot
        .run_until(&mut session, &mut host, DT, MAX_TICKS, |session| {
            !session.in_combat()
        })
        .unwrap();

    let outcome = session.last_outcome().expect("combat finished");
    assert!(
        matches!(outcome.result, CombatResult::Captured | CombatResult::RanAway),
        "{:?}",
        outcome.result
    );
    let player = session.player().expect("player");
    assert_eq!(player.party.monsters()[0].current_hp, player.party.monsters()[0].hp());
}

#[test]
fn encounter_with_a_defeated_party_is_skipped() {
    let mut fainted = monster(1, "rockitten", 5);
    fainted.faint();
    let mut world = world_with_player([fainted]);
    let wild = Npc::wild(world.allocate_entity_id(), monster(2, "bamboon", 3));
    world.enqueue_combat(
        vec![
            Participant::Npc(EntityId::PLAYER),
            Participant::Wild(Box::new(wild)),
        ],
        CombatType::Wild,
        "grass",
    );

    let mut session = session_with(world, config()).unwrap();
    session.tick(DT, &mut RecordingHost::new()).unwrap();
    assert!(!session.in_combat());
    assert!(session.player().is_some());
    assert_eq!(session.world().npcs().count(), 1);
}

#[test]
fn missing_participant_is_reported() {
    let mut world = world_with_player([monster(1, "rockitten", 5)]);
    world.enqueue_combat(
        vec![
            Participant::Npc(EntityId::PLAYER),
            Participant::Npc(EntityId(40)),
        ],
        CombatType::Trainer,
        "grass",
    );

    let mut session = session_with(world, config()).unwrap();
    let error = session.tick(DT, &mut RecordingHost::new()).unwrap_err();
    assert!(matches!(error, SessionError::UnknownParticipant(EntityId(40))));
    assert!(session.player().is_some());
}

#[test]
fn unknown_reward_method_is_fatal_at_startup() {
    let config = GameConfig {
        experience_method: "share_everything".to_owned(),
        ..config()
    };
    let error = session_with(world_with_player([]), config).err().expect("rejected");
    assert_eq!(error.severity(), ErrorSeverity::Fatal);
}

#[test]
fn player_walks_around_a_one_way_line() {
    let map = MapLoader::parse(r#"(dimensions: Some((6, 8)), lines: [(5, 5, up)])"#).unwrap();
    let world = World::new("maze", map.collision.clone(), Npc::player("Red", Position::new(5, 5)));
    let mut session = session_with(world, config()).unwrap();
    session.enter_map("maze", &map).unwrap();

    session.walk_player_to(Position::new(5, 3));
    let route: Vec<Position> = session
        .player()
        .map(|player| player.mover.path().walk_order().collect())
        .unwrap_or_default();
    assert!(route.iter().any(|tile| tile.x == 4), "route {route:?}");
    assert_eq!(route.last(), Some(&Position::new(5, 3)));

    let mut host = RecordingHost::new();
    for _ in 0..MAX_TICKS {
        if session.player().is_some_and(|player| player.tile() == Position::new(5, 3))
            && !session.world().is_moving()
        {
            break;
        }
        session.tick(DT, &mut host).unwrap();
    }
    let player = session.player().expect("player");
    assert_eq!(player.tile(), Position::new(5, 3));
    assert_eq!(player.facing(), Direction::Up);
}
