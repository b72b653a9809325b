//! Techniques, their sort categories and target eligibility.

use super::element::Element;
use super::stats::StatKind;

/// Sort category of a technique, item or status action.
///
/// Drives action ordering; see [`MethodSort::rank`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MethodSort {
    Utility,
    Meta,
    Item,
    #[default]
    Damage,
    Potion,
    Food,
    Quest,
}

impl MethodSort {
    /// Fixed priority list; anything absent sorts after every listed entry.
    pub const PRIORITY: [Self; 3] = [Self::Utility, Self::Meta, Self::Item];

    /// Index into [`MethodSort::PRIORITY`], or its length for unlisted sorts.
    pub fn rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|sort| *sort == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

bitflags::bitflags! {
    /// Which combatants a method may be aimed at.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct TargetFlags: u8 {
        const OWN_MONSTER = 1 << 0;
        const ENEMY_MONSTER = 1 << 1;
        const OWN_TEAM = 1 << 2;
        const ENEMY_TEAM = 1 << 3;
        const OWN_TRAINER = 1 << 4;
        const ENEMY_TRAINER = 1 << 5;
    }
}

impl TargetFlags {
    /// May target a monster on the user's own side.
    pub const fn allows_own(self) -> bool {
        self.intersects(Self::OWN_MONSTER.union(Self::OWN_TEAM))
    }

    /// May target a monster on an opposing side.
    pub const fn allows_enemy(self) -> bool {
        self.intersects(Self::ENEMY_MONSTER.union(Self::ENEMY_TEAM))
    }
}

/// Which attacking and defending stats a damaging technique uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TechniqueRange {
    #[default]
    Melee,
    Touch,
    Ranged,
    Reach,
    Reliable,
    Special,
}

/// One effect of a technique, applied in declaration order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TechEffect {
    /// Damage from the type chart and stats.
    Damage,
    /// Immediate `hp / 8` damage.
    Poison,
    /// Recover status on the user, or heal if it is already present.
    Recover,
    /// Lifeleech status on the target linked to the user.
    Lifeleech,
    /// Halve the target's speed.
    Overfeed,
    /// Chance to give a status by slug.
    GiveStatus { status: String },
    /// Raise or lower a stat.
    StatChange { stat: StatKind, amount: i32 },
    /// Replace the user with the queued replacement.
    Swap,
    /// Leave the encounter.
    Run,
    /// Concede the encounter.
    Forfeit,
}

/// A learned or template technique.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Technique {
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sort: MethodSort,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: TechniqueRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub types: Vec<Element>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: f32,
    /// Hit chance in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub accuracy: f32,
    /// Status application chance in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub potency: f32,
    /// Rounds before the technique is usable again.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recharge: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_area: bool,
    #[cfg_attr(feature = "serde", serde(default = "enemy_monster"))]
    pub target: TargetFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<TechEffect>,
    /// Localization key for the use message.
    #[cfg_attr(feature = "serde", serde(default = "default_use_tech"))]
    pub use_tech: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_success: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_failure: Option<String>,
    /// Rounds remaining before the technique can be chosen.
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_use: u32,
    /// Times used in the current encounter.
    #[cfg_attr(feature = "serde", serde(default))]
    pub combat_counter: u32,
}

#[cfg(feature = "serde")]
fn one() -> f32 {
    1.0
}

#[cfg(feature = "serde")]
fn enemy_monster() -> TargetFlags {
    TargetFlags::ENEMY_MONSTER
}

#[cfg(feature = "serde")]
fn default_use_tech() -> String {
    Technique::DEFAULT_USE.to_owned()
}

impl Technique {
    pub const DEFAULT_USE: &'static str = "combat_used_x";
    pub const RUN: &'static str = "menu_run";
    pub const FORFEIT: &'static str = "menu_forfeit";
    pub const SWAP: &'static str = "swap";
    pub const SKIP: &'static str = "skip";

    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            sort: MethodSort::Damage,
            range: TechniqueRange::Melee,
            types: Vec::new(),
            power: 0.0,
            accuracy: 1.0,
            potency: 1.0,
            recharge: 0,
            is_area: false,
            target: TargetFlags::ENEMY_MONSTER,
            effects: Vec::new(),
            use_tech: Self::DEFAULT_USE.to_owned(),
            use_success: None,
            use_failure: None,
            next_use: 0,
            combat_counter: 0,
        }
    }

    /// Pseudo-technique that removes the user's side.
    pub fn run() -> Self {
        let mut tech = Self::new(Self::RUN);
        tech.sort = MethodSort::Meta;
        tech.target = TargetFlags::OWN_MONSTER;
        tech.effects = vec![TechEffect::Run];
        tech.use_tech = "combat_player_run".to_owned();
        tech
    }

    /// Pseudo-technique that concedes for the user's side.
    pub fn forfeit() -> Self {
        let mut tech = Self::new(Self::FORFEIT);
        tech.sort = MethodSort::Meta;
        tech.target = TargetFlags::OWN_MONSTER;
        tech.effects = vec![TechEffect::Forfeit];
        tech.use_tech = "combat_forfeit".to_owned();
        tech
    }

    /// Pseudo-technique that swaps the user for a benched monster.
    pub fn swap() -> Self {
        let mut tech = Self::new(Self::SWAP);
        tech.sort = MethodSort::Utility;
        tech.target = TargetFlags::OWN_MONSTER;
        tech.effects = vec![TechEffect::Swap];
        tech.use_tech = "combat_swap".to_owned();
        tech
    }

    /// Does nothing; used when no move is available.
    pub fn skip() -> Self {
        let mut tech = Self::new(Self::SKIP);
        tech.target = TargetFlags::OWN_MONSTER;
        tech.use_tech = "combat_skip".to_owned();
        tech
    }

    pub fn with_effects(mut self, effects: Vec<TechEffect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_power(mut self, power: f32) -> Self {
        self.power = power;
        self
    }

    pub fn with_sort(mut self, sort: MethodSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_recharge(mut self, recharge: u32) -> Self {
        self.recharge = recharge;
        self
    }

    pub fn is_recharging(&self) -> bool {
        self.next_use > 0
    }

    /// Counts one round down.
    pub fn recharge_tick(&mut self) {
        self.next_use = self.next_use.saturating_sub(1);
    }

    pub fn full_recharge(&mut self) {
        self.next_use = 0;
    }

    /// Records a use: bumps the counter and starts the recharge.
    pub fn advance_round(&mut self) {
        self.combat_counter += 1;
        self.next_use = self.recharge;
    }

    pub fn has_effect(&self, predicate: impl Fn(&TechEffect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }

    /// Run and forfeit remove a whole side instead of resolving normally.
    pub fn is_escape(&self) -> bool {
        self.has_effect(|effect| matches!(effect, TechEffect::Run | TechEffect::Forfeit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_follows_priority_list() {
        assert_eq!(MethodSort::Utility.rank(), 0);
        assert_eq!(MethodSort::Meta.rank(), 1);
        assert_eq!(MethodSort::Item.rank(), 2);
        assert_eq!(MethodSort::Damage.rank(), 3);
        assert_eq!(MethodSort::Potion.rank(), 3);
    }

    #[test]
    fn recharge_counts_down_after_use() {
        let mut tech = Technique::new("ram").with_recharge(2);
        tech.advance_round();
        assert!(tech.is_recharging());
        tech.recharge_tick();
        tech.recharge_tick();
        assert!(!tech.is_recharging());
        tech.recharge_tick();
        assert_eq!(tech.next_use, 0);
        assert_eq!(tech.combat_counter, 1);
    }

    #[test]
    fn sort_names_parse() {
        assert_eq!("meta".parse::<MethodSort>().ok(), Some(MethodSort::Meta));
        assert!(Technique::run().is_escape());
        assert!(!Technique::swap().is_escape());
    }
}
