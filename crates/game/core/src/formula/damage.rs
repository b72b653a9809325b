//! Damage calculation and the per-effect HP formulas.

use tracing::warn;

use crate::monster::{Element, Monster, Technique, TechniqueRange};

/// Lower bound of the type multiplier.
pub const MIN_MULTIPLIER: f32 = 0.25;
/// Upper bound of the type multiplier.
pub const MAX_MULTIPLIER: f32 = 4.0;

/// Multiplier from attacking types against defending types.
///
/// Each attacking type doubles against a defender whose chart lists it as
/// `extra_damage` and halves against `resist_damage`. The product is clamped
/// to `[0.25, 4.0]`.
pub fn damage_multiplier(attack_types: &[Element], target_types: &[Element]) -> f32 {
    let mut multiplier = 1.0_f32;
    for attack in attack_types {
        for defend in target_types {
            let chart = defend.chart();
            if chart.extra_damage.is_none() {
                continue;
            }
            if chart.extra_damage == Some(*attack) {
                multiplier *= 2.0;
            } else if chart.resist_damage == Some(*attack) {
                multiplier /= 2.0;
            }
        }
    }
    multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
}

/// Damage dealt by `technique` from `user` to `target`.
///
/// # Formula
///
/// `damage = floor(strength * power * multiplier / resist)` where strength
/// and resist depend on the technique range:
///
/// | range    | strength                     | resist          |
/// |----------|------------------------------|-----------------|
/// | melee    | attack * (7 + level)         | defense         |
/// | touch    | attack * (7 + level)         | special_defense |
/// | ranged   | special_attack * (7 + level) | special_defense |
/// | reach    | special_attack * (7 + level) | defense         |
/// | reliable | 7 + level                    | 1               |
///
/// # Returns
///
/// `(damage, multiplier)`; `special` range techniques return `(0, 0.0)`.
pub fn simple_damage_calculate(
    technique: &Technique,
    user: &Monster,
    target: &Monster,
) -> (u32, f32) {
    let level_factor = 7 + user.level;
    let (strength, resist) = match technique.range {
        TechniqueRange::Melee => (user.stats.attack * level_factor, target.stats.defense),
        TechniqueRange::Touch => (
            user.stats.attack * level_factor,
            target.stats.special_defense,
        ),
        TechniqueRange::Ranged => (
            user.stats.special_attack * level_factor,
            target.stats.special_defense,
        ),
        TechniqueRange::Reach => (
            user.stats.special_attack * level_factor,
            target.stats.defense,
        ),
        TechniqueRange::Reliable => (level_factor, 1),
        TechniqueRange::Special => {
            warn!(
                technique = %technique.slug,
                "damage effect on a technique with range 'special'"
            );
            return (0, 0.0);
        }
    };

    let multiplier = damage_multiplier(&technique.types, &target.types);
    let move_strength = technique.power * multiplier;
    let damage = (strength as f32 * move_strength / resist.max(1) as f32) as u32;
    (damage, multiplier)
}

/// Poison damage: `hp / 8`.
pub fn simple_poison(target: &Monster) -> u32 {
    target.hp() / 8
}

/// Recovery: `min(hp / 16, missing hp)`.
pub fn simple_recover(target: &Monster) -> u32 {
    (target.hp() / 16).min(target.hp() - target.current_hp)
}

/// Drained HP: `min(target.hp / 2, target.current_hp, user missing hp)`.
pub fn simple_lifeleech(user: &Monster, target: &Monster) -> u32 {
    (target.hp() / 2)
        .min(target.current_hp)
        .min(user.hp() - user.current_hp)
}

/// Speed removed by overfeeding: `speed / 2`.
pub fn simple_overfeed(target: &Monster) -> u32 {
    target.stats.speed / 2
}

/// Localization key describing how effective a hit was, if notable.
pub fn effectiveness_key(multiplier: f32) -> Option<&'static str> {
    if multiplier >= 4.0 {
        Some("attack_very_effective")
    } else if multiplier >= 2.0 {
        Some("attack_effective")
    } else if multiplier <= 0.25 {
        Some("attack_weak")
    } else if multiplier <= 0.5 {
        Some("attack_resisted")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::{GrowthProfile, StatBlock};
    use crate::state::MonsterId;

    fn monster(types: Vec<Element>) -> Monster {
        Monster::new(MonsterId(1), "dummy", 10)
            .with_base_stats(StatBlock::uniform(1), GrowthProfile::default())
            .with_types(types)
    }

    #[test]
    fn type_chart_doubles_and_halves() {
        assert_eq!(damage_multiplier(&[Element::Water], &[Element::Fire]), 2.0);
        assert_eq!(damage_multiplier(&[Element::Wood], &[Element::Fire]), 0.5);
        assert_eq!(damage_multiplier(&[Element::Metal], &[Element::Wood]), 2.0);
        assert_eq!(damage_multiplier(&[Element::Fire], &[Element::Normal]), 1.0);
    }

    #[test]
    fn multiplier_is_clamped() {
        let attack = [Element::Metal, Element::Metal, Element::Metal];
        let target = [Element::Wood, Element::Wood];
        assert_eq!(damage_multiplier(&attack, &target), MAX_MULTIPLIER);
        let resisted = [Element::Water, Element::Water, Element::Water];
        assert_eq!(damage_multiplier(&resisted, &[Element::Wood]), 0.25);
    }

    #[test]
    fn melee_damage_uses_attack_and_defense() {
        let user = monster(vec![]);
        let target = monster(vec![Element::Normal]);
        let tech = Technique::new("ram").with_power(1.0);
        // attack 17 * (7 + 10) / defense 17
        assert_eq!(simple_damage_calculate(&tech, &user, &target), (17, 1.0));
    }

    #[test]
    fn special_range_deals_nothing() {
        let user = monster(vec![]);
        let mut tech = Technique::new("glare").with_power(3.0);
        tech.range = TechniqueRange::Special;
        assert_eq!(simple_damage_calculate(&tech, &user, &user), (0, 0.0));
    }

    #[test]
    fn hp_formulas_follow_fractions() {
        let mut target = monster(vec![]).with_hp(64);
        assert_eq!(simple_poison(&target), 8);
        target.current_hp = 62;
        assert_eq!(simple_recover(&target), 2);
        let mut user = monster(vec![]).with_hp(64);
        user.current_hp = 60;
        assert_eq!(simple_lifeleech(&user, &target), 4);
    }

    #[test]
    fn effectiveness_keys_follow_multiplier() {
        assert_eq!(effectiveness_key(4.0), Some("attack_very_effective"));
        assert_eq!(effectiveness_key(2.0), Some("attack_effective"));
        assert_eq!(effectiveness_key(1.0), None);
        assert_eq!(effectiveness_key(0.5), Some("attack_resisted"));
        assert_eq!(effectiveness_key(0.25), Some("attack_weak"));
    }
}
