//! Monsters and the static method data they carry.
//!
//! A [`Monster`] is always owned by exactly one party (or by a combat's wild
//! side). Its `owner` field names the NPC without holding it, so parties can
//! move between the world and a running combat freely.
pub mod element;
pub mod item;
pub mod stats;
pub mod status;
pub mod technique;

pub use element::{Element, TypeChart};
pub use item::{ItemDef, ItemEffect, UseContext};
pub use stats::{GrowthProfile, StatBlock, StatGrowth, StatKind, scale_stats};
pub use status::{
    Status, StatusCategory, StatusChange, StatusResponse, StatusStack, StatusSubstitute,
    StatusTick,
};
pub use technique::{MethodSort, TargetFlags, TechEffect, Technique, TechniqueRange};

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::state::{EntityId, MonsterId};

/// Infection state carried between encounters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlagueState {
    #[default]
    Healthy,
    Infected,
    Inoculated,
}

/// A technique learned on reaching a level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovesetEntry {
    pub level_learned: u32,
    pub technique: Technique,
}

/// Species this monster turns into at a level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evolution {
    pub at_level: u32,
    pub into: String,
}

/// What happened while experience was added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelUpReport {
    pub levels_gained: u32,
    /// Slugs of techniques learned along the way.
    pub learned: Vec<String>,
    /// Slugs that could not be learned because the move list was full.
    pub skipped: Vec<String>,
}

/// Moves a monster knows at once.
pub type MoveList = ArrayVec<Technique, { GameConfig::MAX_MOVES }>;

/// A monster instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monster {
    pub id: MonsterId,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub shape: String,
    pub types: Vec<Element>,
    pub level: u32,
    pub current_hp: u32,
    /// Current stats at this level.
    pub stats: StatBlock,
    /// Per-level base values the stats are scaled from.
    pub base_stats: StatBlock,
    pub growth: GrowthProfile,
    pub moves: MoveList,
    pub moveset: Vec<MovesetEntry>,
    pub evolutions: Vec<Evolution>,
    pub status: StatusStack,
    /// NPC holding this monster; `None` for wild monsters.
    pub owner: Option<EntityId>,
    pub plague: PlagueState,
    pub catch_rate: u32,
    pub total_experience: u64,
    pub experience_required_modifier: u32,
    /// Multiplier applied to experience awarded for defeating this monster.
    pub experience_modifier: u32,
    /// Multiplier applied to money awarded for defeating this monster.
    pub money_modifier: f32,
}

impl Monster {
    /// Creates a monster with uniform base stats and no moves.
    ///
    /// Content normally goes through the catalog; this is the bare constructor.
    pub fn new(id: MonsterId, slug: impl Into<String>, level: u32) -> Self {
        let slug = slug.into();
        let level = level.clamp(1, GameConfig::MAX_LEVEL);
        let base_stats = StatBlock::uniform(1);
        let growth = GrowthProfile::default();
        let stats = scale_stats(&base_stats, &growth, level);
        let mut monster = Self {
            id,
            name: slug.clone(),
            slug,
            category: String::new(),
            shape: String::new(),
            types: Vec::new(),
            level,
            current_hp: stats.hp,
            stats,
            base_stats,
            growth,
            moves: MoveList::new(),
            moveset: Vec::new(),
            evolutions: Vec::new(),
            status: StatusStack::new(),
            owner: None,
            plague: PlagueState::Healthy,
            catch_rate: 125,
            total_experience: 0,
            experience_required_modifier: 1,
            experience_modifier: 1,
            money_modifier: 1.0,
        };
        monster.total_experience = monster.experience_required(0);
        monster
    }

    /// Replaces the base stats and recomputes the current ones at full HP.
    pub fn with_base_stats(mut self, base: StatBlock, growth: GrowthProfile) -> Self {
        self.base_stats = base;
        self.growth = growth;
        self.stats = scale_stats(&base, &growth, self.level);
        self.current_hp = self.stats.hp;
        self
    }

    /// Overrides max HP directly, keeping `current_hp` within bounds.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.stats.hp = hp;
        self.current_hp = hp;
        self
    }

    pub fn with_types(mut self, types: Vec<Element>) -> Self {
        self.types = types;
        self
    }

    pub fn with_catch_rate(mut self, catch_rate: u32) -> Self {
        self.catch_rate = catch_rate;
        self
    }

    pub fn with_moves(mut self, moves: impl IntoIterator<Item = Technique>) -> Self {
        for tech in moves {
            self.learn(tech);
        }
        self
    }

    pub const fn hp(&self) -> u32 {
        self.stats.hp
    }

    /// Fainted when HP is zero or the faint status is present.
    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0 || self.status.is_fainted()
    }

    /// Sets current HP, clamped to `[0, hp]`.
    pub fn set_hp(&mut self, value: u32) {
        self.current_hp = value.min(self.hp());
    }

    /// Reduces HP and returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restores HP and returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.hp() - self.current_hp);
        self.current_hp += healed;
        healed
    }

    /// Drops HP to zero and replaces the status stack with faint.
    pub fn faint(&mut self) {
        self.current_hp = 0;
        self.status.set_fainted();
    }

    /// Clears statuses and restores `hp`, never less than one.
    pub fn revive(&mut self, hp: u32) {
        self.status.clear();
        self.current_hp = hp.min(self.hp()).max(1);
    }

    pub fn apply_status(&mut self, status: Status) -> StatusChange {
        self.status.apply(status)
    }

    /// Experience needed to reach `level + offset`.
    ///
    /// # Formula
    ///
    /// `required = experience_required_modifier * level^3`
    pub fn experience_required(&self, offset: i64) -> u64 {
        let level = (i64::from(self.level) + offset).max(0) as u64;
        u64::from(self.experience_required_modifier) * level.pow(3)
    }

    /// Adds experience and levels up as many times as the total allows.
    pub fn give_experience(&mut self, amount: u64) -> LevelUpReport {
        let mut report = LevelUpReport::default();
        self.total_experience = self.total_experience.saturating_add(amount);
        while self.level < GameConfig::MAX_LEVEL
            && self.total_experience >= self.experience_required(1)
        {
            self.level_up(&mut report);
        }
        report
    }

    fn level_up(&mut self, report: &mut LevelUpReport) {
        self.level += 1;
        report.levels_gained += 1;
        let old_hp = self.hp();
        self.stats = scale_stats(&self.base_stats, &self.growth, self.level);
        let gained = self.hp().saturating_sub(old_hp);
        self.current_hp = (self.current_hp + gained).min(self.hp());

        let level = self.level;
        let unlocked: Vec<Technique> = self
            .moveset
            .iter()
            .filter(|entry| entry.level_learned == level)
            .map(|entry| entry.technique.clone())
            .collect();
        for tech in unlocked {
            let slug = tech.slug.clone();
            if self.knows(&slug) {
                continue;
            }
            if self.learn(tech) {
                report.learned.push(slug);
            } else {
                report.skipped.push(slug);
            }
        }
    }

    pub fn knows(&self, slug: &str) -> bool {
        self.moves.iter().any(|tech| tech.slug == slug)
    }

    /// Adds a technique; returns `false` when the move list is full.
    pub fn learn(&mut self, tech: Technique) -> bool {
        self.moves.try_push(tech).is_ok()
    }

    pub fn find_move_mut(&mut self, slug: &str) -> Option<&mut Technique> {
        self.moves.iter_mut().find(|tech| tech.slug == slug)
    }

    /// Moves that are not recharging, with their slot index.
    pub fn usable_moves(&self) -> impl Iterator<Item = (usize, &Technique)> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, tech)| !tech.is_recharging())
    }

    pub fn recharge_moves(&mut self) {
        self.moves.iter_mut().for_each(Technique::recharge_tick);
    }

    /// Clears encounter-only state: recharges, non-faint statuses, counters.
    pub fn end_combat(&mut self) {
        for tech in self.moves.iter_mut() {
            tech.full_recharge();
            tech.combat_counter = 0;
        }
        self.status.clear_conditions();
    }

    /// Species this monster is ready to become, if any.
    pub fn pending_evolution(&self) -> Option<&str> {
        self.evolutions
            .iter()
            .filter(|evo| evo.at_level <= self.level)
            .map(|evo| evo.into.as_str())
            .next()
    }

    /// Turns `self` into `evolved`, keeping identity, experience, moves and HP ratio.
    pub fn evolve_into(&mut self, mut evolved: Monster) {
        let ratio = if self.hp() == 0 {
            0.0
        } else {
            f64::from(self.current_hp) / f64::from(self.hp())
        };
        evolved.id = self.id;
        evolved.owner = self.owner;
        evolved.level = self.level;
        evolved.stats = scale_stats(&evolved.base_stats, &evolved.growth, evolved.level);
        evolved.total_experience = self.total_experience;
        evolved.moves = core::mem::take(&mut self.moves);
        evolved.status = core::mem::take(&mut self.status);
        evolved.plague = self.plague;
        let mut current = (ratio * f64::from(evolved.hp())).round() as u32;
        if self.current_hp > 0 {
            current = current.max(1);
        }
        evolved.current_hp = current.min(evolved.hp());
        *self = evolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(level: u32) -> Monster {
        Monster::new(MonsterId(1), "rockitten", level)
            .with_base_stats(StatBlock::uniform(2), GrowthProfile::default())
    }

    #[test]
    fn damage_and_heal_are_clamped() {
        let mut monster = sample(5).with_hp(20);
        assert_eq!(monster.take_damage(50), 20);
        assert!(monster.is_fainted());
        assert_eq!(monster.heal(100), 20);
        assert!(!monster.is_fainted());
    }

    #[test]
    fn revive_restores_at_least_one_hp() {
        let mut monster = sample(5).with_hp(20);
        monster.faint();
        monster.revive(0);
        assert_eq!(monster.current_hp, 1);
        monster.revive(500);
        assert_eq!(monster.current_hp, 20);

        let mut empty = sample(5).with_hp(0);
        empty.revive(10);
        assert_eq!(empty.current_hp, 1);
        assert!(!empty.is_fainted());
    }

    #[test]
    fn faint_status_marks_fainted_even_with_hp() {
        let mut monster = sample(5);
        monster.status.set_fainted();
        assert!(monster.current_hp > 0);
        assert!(monster.is_fainted());
    }

    #[test]
    fn experience_levels_up_repeatedly() {
        let mut monster = sample(2);
        assert_eq!(monster.total_experience, 8);
        let report = monster.give_experience(64 - 8);
        assert_eq!(monster.level, 4);
        assert_eq!(report.levels_gained, 2);
    }

    #[test]
    fn level_up_learns_moveset_entries() {
        let mut monster = sample(2);
        monster.moveset.push(MovesetEntry {
            level_learned: 3,
            technique: Technique::new("ram"),
        });
        let report = monster.give_experience(27 - 8);
        assert_eq!(report.learned, vec!["ram".to_owned()]);
        assert!(monster.knows("ram"));
    }

    #[test]
    fn full_move_list_skips_new_techniques() {
        let mut monster = sample(2).with_moves(
            ["a", "b", "c", "d"].into_iter().map(Technique::new),
        );
        monster.moveset.push(MovesetEntry {
            level_learned: 3,
            technique: Technique::new("e"),
        });
        let report = monster.give_experience(19);
        assert_eq!(report.skipped, vec!["e".to_owned()]);
        assert_eq!(monster.moves.len(), GameConfig::MAX_MOVES);
    }

    #[test]
    fn evolution_preserves_hp_ratio_and_identity() {
        let mut monster = sample(10).with_hp(40);
        monster.current_hp = 10;
        monster.owner = Some(EntityId::PLAYER);
        let evolved = Monster::new(MonsterId(99), "rockat", 10)
            .with_base_stats(StatBlock::uniform(4), GrowthProfile::default());
        monster.evolve_into(evolved);
        assert_eq!(monster.id, MonsterId(1));
        assert_eq!(monster.slug, "rockat");
        assert_eq!(monster.owner, Some(EntityId::PLAYER));
        assert_eq!(monster.hp(), 68);
        assert_eq!(monster.current_hp, 17);
    }

    #[test]
    fn end_combat_recharges_and_keeps_faint() {
        let mut monster = sample(5).with_moves([Technique::new("ram").with_recharge(3)]);
        monster.moves[0].advance_round();
        monster.faint();
        monster.end_combat();
        assert!(!monster.moves[0].is_recharging());
        assert!(monster.is_fainted());
    }
}
