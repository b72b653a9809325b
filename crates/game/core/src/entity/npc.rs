use strum::{Display, EnumString, IntoStaticStr};

use super::movement::Mover;
use super::party::Party;
use crate::monster::Monster;
use crate::state::{Direction, EntityId, GameVariables, Inventory, Position, Tuxepedia};

/// Decision-making model for AI-controlled trainers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AiKind {
    /// First usable technique against the first opponent.
    #[default]
    Simple,
    /// Random usable technique against a random opponent.
    Random,
    /// Park behaviour: weighs fleeing against fighting by distance.
    Flee,
}

/// Who drives an NPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Controller {
    /// Decisions come from the host's menus.
    Human,
    Ai(AiKind),
    /// Decisions arrive from a remote peer through the host.
    Remote,
}

impl Controller {
    pub const fn is_human(self) -> bool {
        matches!(self, Self::Human)
    }

    pub const fn ai(self) -> Option<AiKind> {
        match self {
            Self::Ai(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Player or non-player character.
///
/// Every actor in the world is an `Npc`; the player is the one with
/// [`EntityId::PLAYER`] and a [`Controller::Human`].
#[derive(Clone, Debug)]
pub struct Npc {
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    pub controller: Controller,
    pub party: Party,
    pub inventory: Inventory,
    pub money: u64,
    pub variables: GameVariables,
    pub tuxepedia: Tuxepedia,
    pub mover: Mover,
}

impl Npc {
    pub fn new(id: EntityId, slug: impl Into<String>, tile: Position) -> Self {
        let slug = slug.into();
        Self {
            id,
            name: slug.clone(),
            slug,
            controller: Controller::Ai(AiKind::Simple),
            party: Party::default(),
            inventory: Inventory::new(),
            money: 0,
            variables: GameVariables::new(),
            tuxepedia: Tuxepedia::new(),
            mover: Mover::new(tile),
        }
    }

    pub fn player(name: impl Into<String>, tile: Position) -> Self {
        let mut npc = Self::new(EntityId::PLAYER, "player", tile);
        npc.name = name.into();
        npc.controller = Controller::Human;
        npc
    }

    /// Wild side of an encounter: an uncontrolled trainer holding one monster.
    pub fn wild(id: EntityId, monster: Monster) -> Self {
        let mut npc = Self::new(id, monster.slug.clone(), Position::ORIGIN);
        npc.name = monster.name.clone();
        npc.party.add_monster(monster, id);
        npc
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.mover.set_facing(facing);
        self
    }

    pub fn is_player(&self) -> bool {
        self.id.is_player()
    }

    pub fn tile(&self) -> Position {
        self.mover.tile()
    }

    pub fn facing(&self) -> Direction {
        self.mover.facing()
    }

    pub fn add_monster(&mut self, monster: Monster) {
        self.party.add_monster(monster, self.id);
        self.set_party_status();
    }

    pub fn has_item(&self, slug: &str) -> bool {
        self.inventory.quantity(slug) > 0
    }

    /// Removes `amount` money; fails without change when short.
    pub fn spend_money(&mut self, amount: u64) -> bool {
        match self.money.checked_sub(amount) {
            Some(rest) => {
                self.money = rest;
                true
            }
            None => false,
        }
    }

    pub fn give_money(&mut self, amount: u64) {
        self.money = self.money.saturating_add(amount);
    }

    /// Publishes party level statistics into the player's variables.
    pub fn set_party_status(&mut self) {
        if !self.is_player() {
            return;
        }
        let Some(summary) = self.party.level_summary() else {
            return;
        };
        self.variables
            .set("party_level_lowest", summary.lowest.to_string());
        self.variables
            .set("party_level_highest", summary.highest.to_string());
        self.variables
            .set("party_level_average", summary.average.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MonsterId;

    #[test]
    fn player_publishes_party_levels() {
        let mut player = Npc::player("Red", Position::new(3, 3));
        player.add_monster(Monster::new(MonsterId(1), "fruitera", 4));
        player.add_monster(Monster::new(MonsterId(2), "rockitten", 8));

        assert_eq!(player.variables.get("party_level_lowest"), Some("4"));
        assert_eq!(player.variables.get("party_level_highest"), Some("8"));
        assert_eq!(player.variables.get("party_level_average"), Some("6"));
        assert_eq!(player.party.monsters()[1].owner, Some(EntityId::PLAYER));
    }

    #[test]
    fn npcs_keep_variables_untouched() {
        let mut npc = Npc::new(EntityId(4), "rival", Position::ORIGIN);
        npc.add_monster(Monster::new(MonsterId(1), "fruitera", 4));
        assert!(!npc.variables.contains("party_level_lowest"));
    }

    #[test]
    fn spending_more_than_owned_fails() {
        let mut npc = Npc::new(EntityId(2), "shopper", Position::ORIGIN);
        npc.give_money(30);
        assert!(!npc.spend_money(31));
        assert!(npc.spend_money(30));
        assert_eq!(npc.money, 0);
    }

    #[test]
    fn controller_parses_ai_kind() {
        assert_eq!("flee".parse::<AiKind>().ok(), Some(AiKind::Flee));
        assert_eq!(Controller::Ai(AiKind::Random).ai(), Some(AiKind::Random));
        assert!(Controller::Human.is_human());
    }
}
