//! Side-effect free tests over world state.

use strum::{Display, EnumString, IntoStaticStr};

use crate::entity::Npc;
use crate::state::{Direction, Position, SeenStatus};
use crate::world::World;

/// `is` keeps a condition's raw result; `is_not` inverts it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operator {
    #[default]
    Is,
    IsNot,
}

/// Numeric comparison used by counting conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Comparison {
    #[default]
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Comparison {
    pub fn test<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            Self::Equals => left == right,
            Self::NotEquals => left != right,
            Self::LessThan => left < right,
            Self::LessOrEqual => left <= right,
            Self::GreaterThan => left > right,
            Self::GreaterOrEqual => left >= right,
        }
    }
}

/// Rectangle of tiles, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub x: i32,
    pub y: i32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub width: u32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub height: u32,
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

impl Area {
    pub const fn tile(pos: Position) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            width: 1,
            height: 1,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionKind {
    /// The player holds at least `quantity` of `item`.
    HasItem { item: String, quantity: u32 },
    MoneyIs { comparison: Comparison, amount: u64 },
    PartySize { comparison: Comparison, size: usize },
    /// The player's party is non-empty and nobody in it has fainted.
    PartyNotFainted,
    /// Strings compare for equality; ordering comparisons parse both sides as numbers.
    VariableIs {
        key: String,
        comparison: Comparison,
        value: String,
    },
    VariableSet { key: String },
    PlayerAt { area: Area },
    NpcAt { npc: String, area: Area },
    PlayerFacing { direction: Direction },
    /// The player finished a step inside `area` this tick.
    PlayerMoved { area: Area },
    /// Caught counts as seen.
    Tuxepedia { monster: String, status: SeenStatus },
    HasMonster { monster: String },
}

/// A test plus the operator that may invert it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub kind: ConditionKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operator: Operator,
}

/// What a condition may look at.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    pub world: &'a World,
    /// Tiles the player arrived on during this tick.
    pub player_arrivals: &'a [Position],
}

impl Condition {
    pub fn is(kind: ConditionKind) -> Self {
        Self {
            kind,
            operator: Operator::Is,
        }
    }

    pub fn is_not(kind: ConditionKind) -> Self {
        Self {
            kind,
            operator: Operator::IsNot,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Raw result compared against the operator.
    pub fn evaluate(&self, context: &ConditionContext<'_>) -> bool {
        self.kind.test(context) == (self.operator == Operator::Is)
    }
}

impl ConditionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HasItem { .. } => "has_item",
            Self::MoneyIs { .. } => "money_is",
            Self::PartySize { .. } => "party_size",
            Self::PartyNotFainted => "party_not_fainted",
            Self::VariableIs { .. } => "variable_is",
            Self::VariableSet { .. } => "variable_set",
            Self::PlayerAt { .. } => "player_at",
            Self::NpcAt { .. } => "npc_at",
            Self::PlayerFacing { .. } => "player_facing",
            Self::PlayerMoved { .. } => "player_moved",
            Self::Tuxepedia { .. } => "tuxepedia",
            Self::HasMonster { .. } => "has_monster",
        }
    }

    /// Raw result, before the operator is applied. A missing player is false.
    pub fn test(&self, context: &ConditionContext<'_>) -> bool {
        let world = context.world;
        let Some(player) = world.player() else {
            return false;
        };
        match self {
            Self::HasItem { item, quantity } => player.inventory.quantity(item) >= *quantity,
            Self::MoneyIs { comparison, amount } => comparison.test(player.money, *amount),
            Self::PartySize { comparison, size } => comparison.test(player.party.len(), *size),
            Self::PartyNotFainted => party_not_fainted(player),
            Self::VariableIs {
                key,
                comparison,
                value,
            } => variable_is(player, key, *comparison, value),
            Self::VariableSet { key } => player.variables.contains(key),
            Self::PlayerAt { area } => area.contains(player.tile()),
            Self::NpcAt { npc, area } => world
                .npc_by_slug(npc)
                .is_some_and(|npc| area.contains(npc.tile())),
            Self::PlayerFacing { direction } => player.facing() == *direction,
            Self::PlayerMoved { area } => context
                .player_arrivals
                .iter()
                .any(|tile| area.contains(*tile)),
            Self::Tuxepedia { monster, status } => player
                .tuxepedia
                .status(monster)
                .is_some_and(|recorded| recorded >= *status),
            Self::HasMonster { monster } => player.party.find(monster).is_some(),
        }
    }
}

fn party_not_fainted(player: &Npc) -> bool {
    let monsters = player.party.monsters();
    !monsters.is_empty() && monsters.iter().all(|monster| !monster.is_fainted())
}

fn variable_is(player: &Npc, key: &str, comparison: Comparison, expected: &str) -> bool {
    let Some(actual) = player.variables.get(key) else {
        return false;
    };
    match comparison {
        Comparison::Equals => actual == expected,
        Comparison::NotEquals => actual != expected,
        ordering => match (actual.parse::<f64>(), expected.parse::<f64>()) {
            (Ok(left), Ok(right)) => ordering.test(left, right),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::CollisionMap;
    use crate::monster::Monster;
    use crate::state::MonsterId;

    fn world() -> World {
        let mut player = Npc::player("Red", Position::new(2, 3));
        player.inventory.add("potion", 2);
        player.money = 150;
        player.add_monster(Monster::new(MonsterId(1), "rockitten", 5));
        World::new("route_1", CollisionMap::new(), player)
    }

    fn check(world: &World, condition: &Condition) -> bool {
        let context = ConditionContext {
            world,
            player_arrivals: &[],
        };
        condition.evaluate(&context)
    }

    #[test]
    fn operator_inverts_raw_result() {
        let world = world();
        let has_potion = ConditionKind::HasItem {
            item: "potion".to_owned(),
            quantity: 1,
        };
        assert!(check(&world, &Condition::is(has_potion.clone())));
        assert!(!check(&world, &Condition::is_not(has_potion)));
    }

    #[test]
    fn money_and_party_counts_compare() {
        let world = world();
        let rich = Condition::is(ConditionKind::MoneyIs {
            comparison: Comparison::GreaterOrEqual,
            amount: 100,
        });
        assert!(check(&world, &rich));
        let full = Condition::is(ConditionKind::PartySize {
            comparison: Comparison::Equals,
            size: 6,
        });
        assert!(!check(&world, &full));
    }

    #[test]
    fn fainted_member_fails_party_check() {
        let mut world = world();
        assert!(check(&world, &Condition::is(ConditionKind::PartyNotFainted)));
        if let Some(player) = world.player_mut() {
            player.party.monsters_mut()[0].faint();
        }
        assert!(!check(&world, &Condition::is(ConditionKind::PartyNotFainted)));
    }

    #[test]
    fn variables_compare_as_text_or_numbers() {
        let mut world = world();
        if let Some(player) = world.player_mut() {
            player.variables.set("steps", "12");
        }
        let equal = ConditionKind::VariableIs {
            key: "steps".to_owned(),
            comparison: Comparison::Equals,
            value: "12".to_owned(),
        };
        let greater = ConditionKind::VariableIs {
            key: "steps".to_owned(),
            comparison: Comparison::GreaterThan,
            value: "9".to_owned(),
        };
        assert!(check(&world, &Condition::is(equal)));
        assert!(check(&world, &Condition::is(greater)));
        let unset = ConditionKind::VariableSet {
            key: "badge".to_owned(),
        };
        assert!(check(&world, &Condition::is_not(unset)));
    }

    #[test]
    fn area_conditions_use_tiles() {
        let world = world();
        let area = Area {
            x: 1,
            y: 3,
            width: 2,
            height: 1,
        };
        assert!(check(&world, &Condition::is(ConditionKind::PlayerAt { area })));

        let moved = Condition::is(ConditionKind::PlayerMoved { area });
        assert!(!check(&world, &moved));
        let arrivals = [Position::new(2, 3)];
        let context = ConditionContext {
            world: &world,
            player_arrivals: &arrivals,
        };
        assert!(moved.evaluate(&context));
    }

    #[test]
    fn caught_counts_as_seen() {
        let mut world = world();
        if let Some(player) = world.player_mut() {
            player.tuxepedia.record("bamboon", SeenStatus::Caught);
        }
        let seen = Condition::is(ConditionKind::Tuxepedia {
            monster: "bamboon".to_owned(),
            status: SeenStatus::Seen,
        });
        assert!(check(&world, &seen));
    }
}
