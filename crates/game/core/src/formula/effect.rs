//! Technique effect application.
//!
//! One closed `match` over [`TechEffect`]. Effects that touch the user are
//! reported in the outcome instead of applied, so callers never need two
//! mutable borrows into the same party.

use tracing::warn;

use super::damage::{simple_damage_calculate, simple_overfeed, simple_poison, simple_recover};
use crate::env::{ContentCatalog, RngOracle};
use crate::monster::{Monster, Status, StatusCategory, StatusTick, TechEffect, Technique};

pub const STATUS_RECOVER: &str = "status_recover";
pub const STATUS_LIFELEECH: &str = "status_lifeleech";

/// Summary of one technique use.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectOutcome {
    pub success: bool,
    pub damage: u32,
    pub element_multiplier: f32,
    /// The target was struck; recorded in the damage map.
    pub should_tackle: bool,
    /// Statuses newly given to the target.
    pub statuses: Vec<String>,
    /// HP to restore on the user.
    pub user_heal: u32,
    /// Status to apply to the user.
    pub user_status: Option<Status>,
}

impl Default for EffectOutcome {
    fn default() -> Self {
        Self {
            success: false,
            damage: 0,
            element_multiplier: 1.0,
            should_tackle: false,
            statuses: Vec::new(),
            user_heal: 0,
            user_status: None,
        }
    }
}

fn fallback_status(slug: &str) -> Status {
    match slug {
        STATUS_RECOVER => Status::new(slug, StatusCategory::Positive).with_tick(StatusTick::Recover),
        STATUS_LIFELEECH => {
            Status::new(slug, StatusCategory::Negative).with_tick(StatusTick::Lifeleech)
        }
        _ => Status::new(slug, StatusCategory::Neutral),
    }
}

fn lookup_status(catalog: &ContentCatalog, slug: &str) -> Status {
    catalog
        .status(slug)
        .unwrap_or_else(|_| fallback_status(slug))
}

/// Applies every effect of `technique` in order.
///
/// `user` is a snapshot taken before the use; `target` is mutated in place
/// and may be the same monster as the user.
pub fn apply_technique(
    technique: &Technique,
    user: &Monster,
    target: &mut Monster,
    catalog: &ContentCatalog,
    rng: &mut dyn RngOracle,
) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();
    let has_damage = technique.has_effect(|effect| matches!(effect, TechEffect::Damage));
    let mut can_apply_status = !has_damage;

    for effect in &technique.effects {
        match effect {
            TechEffect::Damage => {
                let hit = rng.unit() <= f64::from(technique.accuracy);
                if !hit && !technique.is_area {
                    continue;
                }
                can_apply_status = true;
                let (mut damage, multiplier) = simple_damage_calculate(technique, user, target);
                if !hit {
                    damage /= 2;
                }
                let dealt = target.take_damage(damage);
                outcome.damage += dealt;
                outcome.element_multiplier = multiplier;
                outcome.should_tackle |= dealt > 0;
                outcome.success |= dealt > 0;
            }
            TechEffect::Poison => {
                let dealt = target.take_damage(simple_poison(target));
                outcome.damage += dealt;
                outcome.success |= dealt > 0;
            }
            TechEffect::Recover => {
                if user.status.contains(STATUS_RECOVER) {
                    let heal = simple_recover(user);
                    outcome.user_heal += heal;
                    outcome.success |= heal > 0;
                } else if rng.unit() <= f64::from(technique.potency) {
                    outcome.user_status =
                        Some(lookup_status(catalog, STATUS_RECOVER).with_link(user.id));
                    outcome.success = true;
                }
            }
            TechEffect::Lifeleech => {
                if target.status.contains(STATUS_LIFELEECH) {
                    continue;
                }
                if rng.unit() <= f64::from(technique.potency) {
                    let status = lookup_status(catalog, STATUS_LIFELEECH).with_link(user.id);
                    if target.apply_status(status).took_effect() {
                        outcome.statuses.push(STATUS_LIFELEECH.to_owned());
                        outcome.success = true;
                    }
                }
            }
            TechEffect::Overfeed => {
                let loss = simple_overfeed(target);
                target.stats.speed -= loss;
                outcome.success |= loss > 0;
            }
            TechEffect::GiveStatus { status } => {
                if !can_apply_status || target.status.contains(status) {
                    continue;
                }
                if rng.unit() > f64::from(technique.potency) {
                    continue;
                }
                let Ok(template) = catalog.status(status) else {
                    warn!(technique = %technique.slug, status = %status, "unknown status");
                    continue;
                };
                if status == Status::FAINT {
                    target.faint();
                    outcome.success = true;
                    continue;
                }
                if target.apply_status(template.with_link(user.id)).took_effect() {
                    outcome.statuses.push(status.clone());
                    outcome.success = true;
                }
            }
            TechEffect::StatChange { stat, amount } => {
                let value = target.stats.get_mut(*stat);
                let changed = value.saturating_add_signed(*amount).max(1);
                outcome.success |= changed != *value;
                *value = changed;
            }
            // Resolved by the engine before effects are applied.
            TechEffect::Swap | TechEffect::Run | TechEffect::Forfeit => {}
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;
    use crate::monster::{GrowthProfile, StatBlock, StatKind, StatusResponse};
    use crate::state::MonsterId;

    fn monster(id: u32) -> Monster {
        Monster::new(MonsterId(id), "dummy", 10)
            .with_base_stats(StatBlock::uniform(2), GrowthProfile::default())
    }

    fn catalog() -> ContentCatalog {
        let mut catalog = ContentCatalog::new();
        catalog.insert_status(
            Status::new("status_poison", StatusCategory::Negative)
                .with_tick(StatusTick::Poison)
                .with_responses(StatusResponse::Replaced, StatusResponse::Blocked),
        );
        catalog
    }

    #[test]
    fn damage_records_a_tackle() {
        let user = monster(1);
        let mut target = monster(2);
        let tech = Technique::new("ram")
            .with_power(1.0)
            .with_effects(vec![TechEffect::Damage]);
        let mut rng = ScriptedRng::new(vec![0]);
        let outcome = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
        assert!(outcome.should_tackle);
        assert_eq!(outcome.damage, 17);
        assert_eq!(target.current_hp, target.hp() - 17);
    }

    #[test]
    fn missed_damage_blocks_follow_up_status() {
        let user = monster(1);
        let mut target = monster(2);
        let mut tech = Technique::new("sting").with_power(1.0).with_effects(vec![
            TechEffect::Damage,
            TechEffect::GiveStatus {
                status: "status_poison".to_owned(),
            },
        ]);
        tech.accuracy = 0.5;
        let mut rng = ScriptedRng::new(vec![u32::MAX]);
        let outcome = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
        assert!(!outcome.success);
        assert!(target.status.is_empty());
    }

    #[test]
    fn pure_status_technique_applies_status() {
        let user = monster(1);
        let mut target = monster(2);
        let tech = Technique::new("toxic").with_effects(vec![TechEffect::GiveStatus {
            status: "status_poison".to_owned(),
        }]);
        let mut rng = ScriptedRng::new(vec![0]);
        let outcome = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
        assert_eq!(outcome.statuses, vec!["status_poison".to_owned()]);
        assert_eq!(target.status.head().and_then(|s| s.link), Some(MonsterId(1)));
    }

    #[test]
    fn recover_heals_once_status_is_present() {
        let mut user = monster(1).with_hp(64);
        user.current_hp = 10;
        let tech = Technique::new("rest").with_effects(vec![TechEffect::Recover]);
        let mut rng = ScriptedRng::new(vec![0]);
        let mut target = user.clone();
        let first = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
        let status = first.user_status.expect("recover status");
        user.apply_status(status);
        let second = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
        assert_eq!(second.user_heal, 4);
    }

    #[test]
    fn utility_effects_leave_the_target_alone() {
        let user = monster(1);
        let mut target = monster(2);
        let before = target.clone();
        let mut rng = ScriptedRng::new(vec![0]);
        for tech in [Technique::run(), Technique::swap(), Technique::forfeit()] {
            let outcome = apply_technique(&tech, &user, &mut target, &catalog(), &mut rng);
            assert_eq!(outcome, EffectOutcome::default());
        }
        assert_eq!(target, before);
    }

    #[test]
    fn stat_change_lowers_speed() {
        let user = monster(1);
        let mut target = monster(2);
        let speed = target.stats.speed;
        let mut rng = ScriptedRng::new(vec![0]);

        let slow = Technique::new("mud").with_effects(vec![TechEffect::StatChange {
            stat: StatKind::Speed,
            amount: -5,
        }]);
        apply_technique(&slow, &user, &mut target, &catalog(), &mut rng);
        assert_eq!(target.stats.speed, speed - 5);
    }
}
