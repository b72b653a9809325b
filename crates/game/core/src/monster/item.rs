//! Item definitions and their target predicates.

use super::Monster;
use super::technique::{MethodSort, TargetFlags};

/// One effect of an item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ItemEffect {
    /// Restore a fixed amount of HP.
    Heal { amount: u32 },
    /// Bring a fainted monster back with the given HP.
    Revive { hp: u32 },
    /// Remove every non-faint status.
    CureStatus,
    /// Attempt a capture with the given power multiplier.
    Capture { power: f32 },
    /// Change the distance to a wild monster in park encounters.
    Lure { distance: i32 },
}

/// Where an item may be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UseContext {
    World,
    Combat,
}

/// Static item data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDef {
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default = "item_sort"))]
    pub sort: MethodSort,
    #[cfg_attr(feature = "serde", serde(default = "own_monster"))]
    pub target: TargetFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<ItemEffect>,
    #[cfg_attr(feature = "serde", serde(default = "default_use_item"))]
    pub use_item: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_success: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_failure: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "yes"))]
    pub usable_in_combat: bool,
    #[cfg_attr(feature = "serde", serde(default = "yes"))]
    pub usable_in_world: bool,
}

#[cfg(feature = "serde")]
fn item_sort() -> MethodSort {
    MethodSort::Item
}

#[cfg(feature = "serde")]
fn own_monster() -> TargetFlags {
    TargetFlags::OWN_MONSTER
}

#[cfg(feature = "serde")]
fn default_use_item() -> String {
    ItemDef::DEFAULT_USE.to_owned()
}

#[cfg(feature = "serde")]
fn yes() -> bool {
    true
}

impl ItemDef {
    pub const DEFAULT_USE: &'static str = "combat_used_item";

    pub fn new(slug: impl Into<String>, effects: Vec<ItemEffect>) -> Self {
        Self {
            slug: slug.into(),
            sort: MethodSort::Item,
            target: TargetFlags::OWN_MONSTER,
            effects,
            use_item: Self::DEFAULT_USE.to_owned(),
            use_success: None,
            use_failure: None,
            usable_in_combat: true,
            usable_in_world: true,
        }
    }

    /// Capture device aimed at enemy monsters.
    pub fn capture_device(slug: impl Into<String>, power: f32) -> Self {
        let mut item = Self::new(slug, vec![ItemEffect::Capture { power }]);
        item.target = TargetFlags::ENEMY_MONSTER;
        item.usable_in_world = false;
        item.use_item = "attempting_capture".to_owned();
        item
    }

    pub fn is_capture_device(&self) -> bool {
        self.capture_power().is_some()
    }

    pub fn capture_power(&self) -> Option<f32> {
        self.effects.iter().find_map(|effect| match effect {
            ItemEffect::Capture { power } => Some(*power),
            _ => None,
        })
    }

    pub fn usable_in(&self, context: UseContext) -> bool {
        match context {
            UseContext::World => self.usable_in_world,
            UseContext::Combat => self.usable_in_combat,
        }
    }

    /// Whether every effect of this item can act on `target`.
    pub fn is_valid_target(&self, target: &Monster) -> bool {
        self.effects.iter().all(|effect| match effect {
            ItemEffect::Heal { .. } => !target.is_fainted() && target.current_hp < target.hp(),
            ItemEffect::Revive { .. } => target.is_fainted(),
            ItemEffect::CureStatus => target.status.has_condition(),
            ItemEffect::Capture { .. } => target.owner.is_none() && !target.is_fainted(),
            ItemEffect::Lure { .. } => target.owner.is_none(),
        })
    }

    /// Applies the non-combat effects to `target`; returns whether anything changed.
    ///
    /// Capture and lure effects only act inside combat and are ignored here.
    pub fn apply_to(&self, target: &mut Monster) -> bool {
        let mut changed = false;
        for effect in &self.effects {
            match effect {
                ItemEffect::Heal { amount } => changed |= target.heal(*amount) > 0,
                ItemEffect::Revive { hp } => {
                    if target.is_fainted() {
                        target.revive(*hp);
                        changed = true;
                    }
                }
                ItemEffect::CureStatus => {
                    if target.status.has_condition() {
                        target.status.clear_conditions();
                        changed = true;
                    }
                }
                ItemEffect::Capture { .. } | ItemEffect::Lure { .. } => {}
            }
        }
        changed
    }
}
