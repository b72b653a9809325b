//! Scripted map actions.
//!
//! Each [`MapAction`] runs to completion in one call and reports through
//! [`ActionFlow`] whether the event may continue or has to wait.

use strum::{Display, EnumString, IntoStaticStr};

use crate::engine::{CombatHost, CombatType, HostCall, RecordingHost};
use crate::entity::Npc;
use crate::env::{CatalogError, ContentCatalog, Localizer};
use crate::error::{ErrorSeverity, GameError};
use crate::map::Path;
use crate::state::{Direction, EntityId, Position};
use crate::world::{Participant, World};

/// Input button an event can wait on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Button {
    #[default]
    A,
    B,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOperation {
    fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            Self::Add => Some(left + right),
            Self::Subtract => Some(left - right),
            Self::Multiply => Some(left * right),
            Self::Divide if right == 0.0 => None,
            Self::Divide => Some(left / right),
        }
    }
}

/// What the engine does after an action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionFlow {
    Continue,
    /// Hold the event for this many seconds.
    Wait(f32),
    /// Hold the event until the button is released.
    WaitForInput(Button),
}

/// NPC references are slugs; `None` means the player.
#[derive(Clone, Debug, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MapAction {
    SetVariable {
        key: String,
        value: String,
    },
    ClearVariable {
        key: String,
    },
    /// `result = key <operation> operand`; the result defaults to `key`.
    VariableMath {
        key: String,
        operation: MathOperation,
        operand: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        result: Option<String>,
    },
    TransferMoney {
        from: String,
        to: String,
        amount: u64,
    },
    AddItem {
        item: String,
        #[cfg_attr(feature = "serde", serde(default = "one"))]
        quantity: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        npc: Option<String>,
    },
    RemoveItem {
        item: String,
        #[cfg_attr(feature = "serde", serde(default = "one"))]
        quantity: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        npc: Option<String>,
    },
    AddMonster {
        monster: String,
        level: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        npc: Option<String>,
    },
    /// Sets a party member's HP to a fraction of its maximum; zero faints it.
    SetMonsterHealth {
        slot: usize,
        health: f32,
    },
    /// `None` clears every condition.
    SetMonsterStatus {
        slot: usize,
        #[cfg_attr(feature = "serde", serde(default))]
        status: Option<String>,
    },
    GiveExperience {
        slot: usize,
        amount: u64,
    },
    /// Walks a route written as direction letters, e.g. `"uull"`.
    NpcMove {
        npc: String,
        route: String,
    },
    Pathfind {
        npc: String,
        tile: Position,
    },
    NpcFace {
        npc: String,
        direction: Direction,
    },
    Teleport {
        npc: String,
        tile: Position,
    },
    Dialog {
        text: String,
    },
    Wait {
        seconds: f32,
    },
    WaitForInput {
        button: Button,
    },
    StartBattle {
        npc: String,
        #[cfg_attr(feature = "serde", serde(default = "default_environment"))]
        environment: String,
    },
    WildEncounter {
        monster: String,
        level: u32,
        #[cfg_attr(feature = "serde", serde(default = "default_environment"))]
        environment: String,
    },
    FadeoutMusic {
        duration_ms: u32,
    },
    SetPartyStatus {
        #[cfg_attr(feature = "serde", serde(default))]
        npc: Option<String>,
    },
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn default_environment() -> String {
    "grass".to_owned()
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("no npc with slug '{0}'")]
    UnknownNpc(String),

    #[error("'{from}' cannot pay {amount}")]
    InsufficientFunds { from: String, amount: u64 },

    #[error("party slot {0} is empty")]
    InvalidSlot(usize),

    #[error("route '{0}' contains an unknown direction")]
    BadRoute(String),

    #[error("division by zero in variable '{0}'")]
    DivideByZero(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientFunds { .. } => ErrorSeverity::Recoverable,
            Self::Catalog(error) => error.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownNpc(_) => "ACTION_UNKNOWN_NPC",
            Self::InsufficientFunds { .. } => "ACTION_INSUFFICIENT_FUNDS",
            Self::InvalidSlot(_) => "ACTION_INVALID_SLOT",
            Self::BadRoute(_) => "ACTION_BAD_ROUTE",
            Self::DivideByZero(_) => "ACTION_DIVIDE_BY_ZERO",
            Self::Catalog(error) => error.error_code(),
        }
    }
}

/// Capabilities scripted actions need from the application.
pub trait EventHost {
    fn dialog(&mut self, text: &str);

    fn fade_music(&mut self, duration_ms: u32);
}

impl EventHost for RecordingHost {
    fn dialog(&mut self, text: &str) {
        self.calls.push(HostCall::Alert(text.to_owned()));
    }

    fn fade_music(&mut self, duration_ms: u32) {
        CombatHost::fade_music(self, duration_ms);
    }
}

/// Everything an action may touch.
pub struct EventContext<'a> {
    pub world: &'a mut World,
    pub catalog: &'a ContentCatalog,
    pub locale: &'a Localizer,
    pub host: &'a mut dyn EventHost,
}

impl MapAction {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Applies the action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when a referenced NPC, slot or content entry
    /// does not exist. Nothing is changed in that case.
    pub fn execute(&self, context: &mut EventContext<'_>) -> Result<ActionFlow, ActionError> {
        match self {
            Self::SetVariable { key, value } => {
                player(context.world)?.variables.set(key.clone(), value.clone());
            }
            Self::ClearVariable { key } => {
                player(context.world)?.variables.remove(key);
            }
            Self::VariableMath {
                key,
                operation,
                operand,
                result,
            } => {
                let player = player(context.world)?;
                let current = player.variables.number(key).unwrap_or(0.0);
                let value = operation
                    .apply(current, *operand)
                    .ok_or_else(|| ActionError::DivideByZero(key.clone()))?;
                let target = result.as_ref().unwrap_or(key);
                player.variables.set(target.clone(), format_number(value));
            }
            Self::TransferMoney { from, to, amount } => {
                let payer = resolve(context.world, Some(from))?;
                let payee = resolve(context.world, Some(to))?;
                let paid = context
                    .world
                    .npc_mut(payer)
                    .is_some_and(|npc| npc.spend_money(*amount));
                if !paid {
                    return Err(ActionError::InsufficientFunds {
                        from: from.clone(),
                        amount: *amount,
                    });
                }
                npc_mut(context.world, payee)?.give_money(*amount);
            }
            Self::AddItem { item, quantity, npc } => {
                context.catalog.item(item)?;
                let id = resolve(context.world, npc.as_ref())?;
                npc_mut(context.world, id)?
                    .inventory
                    .add(item.clone(), *quantity);
            }
            Self::RemoveItem { item, quantity, npc } => {
                let id = resolve(context.world, npc.as_ref())?;
                npc_mut(context.world, id)?.inventory.remove(item, *quantity);
            }
            Self::AddMonster {
                monster,
                level,
                npc,
            } => {
                let id = resolve(context.world, npc.as_ref())?;
                let monster_id = context.world.allocate_monster_id();
                let created = context.catalog.create_monster(monster, *level, monster_id)?;
                npc_mut(context.world, id)?.add_monster(created);
            }
            Self::SetMonsterHealth { slot, health } => {
                let monster = player(context.world)?
                    .party
                    .monsters_mut()
                    .get_mut(*slot)
                    .ok_or(ActionError::InvalidSlot(*slot))?;
                let hp = (monster.hp() as f32 * health.clamp(0.0, 1.0)).round() as u32;
                if hp == 0 {
                    monster.faint();
                } else {
                    monster.set_hp(hp);
                }
            }
            Self::SetMonsterStatus { slot, status } => {
                let status = status
                    .as_ref()
                    .map(|slug| context.catalog.status(slug))
                    .transpose()?;
                let monster = player(context.world)?
                    .party
                    .monsters_mut()
                    .get_mut(*slot)
                    .ok_or(ActionError::InvalidSlot(*slot))?;
                match status {
                    Some(status) => {
                        monster.apply_status(status);
                    }
                    None => monster.status.clear_conditions(),
                }
            }
            Self::GiveExperience { slot, amount } => {
                let monster = player(context.world)?
                    .party
                    .monsters_mut()
                    .get_mut(*slot)
                    .ok_or(ActionError::InvalidSlot(*slot))?;
                let report = monster.give_experience(*amount);
                if report.levels_gained > 0 {
                    tracing::info!(monster = %monster.slug, level = monster.level, "level up");
                }
            }
            Self::NpcMove { npc, route } => {
                let id = resolve(context.world, Some(npc))?;
                let mover = &mut npc_mut(context.world, id)?.mover;
                let path = parse_route(mover.tile(), route)?;
                mover.follow(path);
            }
            Self::Pathfind { npc, tile } => {
                let id = resolve(context.world, Some(npc))?;
                context.world.pathfind(id, *tile);
            }
            Self::NpcFace { npc, direction } => {
                let id = resolve(context.world, Some(npc))?;
                npc_mut(context.world, id)?.mover.set_facing(*direction);
            }
            Self::Teleport { npc, tile } => {
                let id = resolve(context.world, Some(npc))?;
                npc_mut(context.world, id)?.mover.teleport(*tile);
            }
            Self::Dialog { text } => {
                context.host.dialog(&context.locale.translate(text));
                return Ok(ActionFlow::WaitForInput(Button::A));
            }
            Self::Wait { seconds } => return Ok(ActionFlow::Wait(*seconds)),
            Self::WaitForInput { button } => return Ok(ActionFlow::WaitForInput(*button)),
            Self::StartBattle { npc, environment } => {
                let id = resolve(context.world, Some(npc))?;
                context.world.enqueue_combat(
                    vec![Participant::Npc(EntityId::PLAYER), Participant::Npc(id)],
                    CombatType::Trainer,
                    environment.clone(),
                );
            }
            Self::WildEncounter {
                monster,
                level,
                environment,
            } => {
                let monster_id = context.world.allocate_monster_id();
                let created = context.catalog.create_monster(monster, *level, monster_id)?;
                let holder = context.world.allocate_entity_id();
                context.world.enqueue_combat(
                    vec![
                        Participant::Npc(EntityId::PLAYER),
                        Participant::Wild(Box::new(Npc::wild(holder, created))),
                    ],
                    CombatType::Wild,
                    environment.clone(),
                );
            }
            Self::FadeoutMusic { duration_ms } => context.host.fade_music(*duration_ms),
            Self::SetPartyStatus { npc } => {
                let id = resolve(context.world, npc.as_ref())?;
                npc_mut(context.world, id)?.set_party_status();
            }
        }
        Ok(ActionFlow::Continue)
    }
}

fn resolve(world: &World, slug: Option<&String>) -> Result<EntityId, ActionError> {
    match slug {
        None => Ok(EntityId::PLAYER),
        Some(slug) => world
            .npc_id_by_slug(slug)
            .ok_or_else(|| ActionError::UnknownNpc(slug.clone())),
    }
}

fn npc_mut(world: &mut World, id: EntityId) -> Result<&mut Npc, ActionError> {
    world
        .npc_mut(id)
        .ok_or_else(|| ActionError::UnknownNpc(id.to_string()))
}

fn player(world: &mut World) -> Result<&mut Npc, ActionError> {
    npc_mut(world, EntityId::PLAYER)
}

/// Turns `"uurd"` into the tiles walked from `origin`. Whitespace is ignored.
fn parse_route(origin: Position, route: &str) -> Result<Path, ActionError> {
    let mut tiles = Vec::new();
    let mut tile = origin;
    for c in route.chars().filter(|c| !c.is_whitespace()) {
        let direction =
            Direction::from_short(c).ok_or_else(|| ActionError::BadRoute(route.to_owned()))?;
        tile = tile.step(direction);
        tiles.push(tile);
    }
    Ok(Path::from_walk_order(tiles))
}

/// Whole numbers are stored without a fraction so they read back as text cleanly.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MonsterTemplate;
    use crate::map::CollisionMap;
    use crate::monster::{ItemDef, Monster, StatBlock};
    use crate::state::MonsterId;

    struct Fixture {
        world: World,
        catalog: ContentCatalog,
        locale: Localizer,
        host: RecordingHost,
    }

    impl Fixture {
        fn new() -> Self {
            let mut player = Npc::player("Red", Position::new(2, 2));
            player.money = 50;
            player.add_monster(Monster::new(MonsterId(1), "rockitten", 5));
            let mut world = World::new("town", CollisionMap::with_bounds(8, 8), player);
            world.spawn_npc("shopkeeper", Position::new(5, 5));

            let mut catalog = ContentCatalog::new();
            catalog.insert_monster(MonsterTemplate::new("bamboon", StatBlock::uniform(3)));
            catalog.insert_item(ItemDef::new("potion", Vec::new()));
            Self {
                world,
                catalog,
                locale: Localizer::new("en_US"),
                host: RecordingHost::new(),
            }
        }

        fn run(&mut self, action: MapAction) -> Result<ActionFlow, ActionError> {
            let mut context = EventContext {
                world: &mut self.world,
                catalog: &self.catalog,
                locale: &self.locale,
                host: &mut self.host,
            };
            action.execute(&mut context)
        }

        fn player(&self) -> &Npc {
            self.world.player().expect("player")
        }
    }

    #[test]
    fn variable_math_writes_whole_numbers() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::SetVariable {
                key: "steps".to_owned(),
                value: "4".to_owned(),
            })
            .unwrap();
        fixture
            .run(MapAction::VariableMath {
                key: "steps".to_owned(),
                operation: MathOperation::Multiply,
                operand: 3.0,
                result: None,
            })
            .unwrap();
        assert_eq!(fixture.player().variables.get("steps"), Some("12"));

        let divide = fixture.run(MapAction::VariableMath {
            key: "steps".to_owned(),
            operation: MathOperation::Divide,
            operand: 0.0,
            result: None,
        });
        assert_eq!(divide, Err(ActionError::DivideByZero("steps".to_owned())));
    }

    #[test]
    fn transfer_fails_without_funds() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::TransferMoney {
                from: "player".to_owned(),
                to: "shopkeeper".to_owned(),
                amount: 30,
            })
            .unwrap();
        assert_eq!(fixture.player().money, 20);

        let result = fixture.run(MapAction::TransferMoney {
            from: "player".to_owned(),
            to: "shopkeeper".to_owned(),
            amount: 30,
        });
        assert!(matches!(result, Err(ActionError::InsufficientFunds { .. })));
        assert_eq!(fixture.player().money, 20);
    }

    #[test]
    fn items_and_monsters_come_from_the_catalog() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::AddItem {
                item: "potion".to_owned(),
                quantity: 2,
                npc: None,
            })
            .unwrap();
        assert_eq!(fixture.player().inventory.quantity("potion"), 2);

        let missing = fixture.run(MapAction::AddItem {
            item: "elixir".to_owned(),
            quantity: 1,
            npc: None,
        });
        assert!(matches!(missing, Err(ActionError::Catalog(_))));

        fixture
            .run(MapAction::AddMonster {
                monster: "bamboon".to_owned(),
                level: 3,
                npc: None,
            })
            .unwrap();
        let party = &fixture.player().party;
        assert_eq!(party.len(), 2);
        assert_eq!(party.monsters()[1].id, MonsterId(2));
    }

    #[test]
    fn zero_health_faints() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::SetMonsterHealth {
                slot: 0,
                health: 0.0,
            })
            .unwrap();
        assert!(fixture.player().party.monsters()[0].is_fainted());
        let bad = fixture.run(MapAction::SetMonsterHealth {
            slot: 4,
            health: 1.0,
        });
        assert_eq!(bad, Err(ActionError::InvalidSlot(4)));
    }

    #[test]
    fn npc_move_walks_the_route() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::NpcMove {
                npc: "shopkeeper".to_owned(),
                route: "uul".to_owned(),
            })
            .unwrap();
        for _ in 0..200 {
            fixture.world.update_movement(0.05);
        }
        let shopkeeper = fixture.world.npc_by_slug("shopkeeper").unwrap();
        assert_eq!(shopkeeper.tile(), Position::new(4, 3));

        let bad = fixture.run(MapAction::NpcMove {
            npc: "shopkeeper".to_owned(),
            route: "ux".to_owned(),
        });
        assert!(matches!(bad, Err(ActionError::BadRoute(_))));
    }

    #[test]
    fn dialog_waits_for_confirm() {
        let mut fixture = Fixture::new();
        let flow = fixture
            .run(MapAction::Dialog {
                text: "hello".to_owned(),
            })
            .unwrap();
        assert_eq!(flow, ActionFlow::WaitForInput(Button::A));
        assert_eq!(fixture.host.alerts().collect::<Vec<_>>(), ["hello"]);
    }

    #[test]
    fn wild_encounter_queues_a_combat() {
        let mut fixture = Fixture::new();
        fixture
            .run(MapAction::WildEncounter {
                monster: "bamboon".to_owned(),
                level: 4,
                environment: "grass".to_owned(),
            })
            .unwrap();
        let request = fixture.world.take_pending_combat().unwrap();
        assert_eq!(request.combat_type, CombatType::Wild);
        assert_eq!(request.participants.len(), 2);
    }
}
