//! Resolution of queued actions and the faint checks that follow them.

use std::sync::Arc;

use tracing::{debug, info};

use super::{
    ActionUser, Combat, CombatAnimation, CombatError, CombatHost, CombatPhase, CombatResult,
    CombatTask, CombatType, EnqueuedAction, Method, SideExit,
};
use crate::env::RngOracle;
use crate::formula::{
    CaptureInput, ExperienceShare, apply_technique, award_experience, award_money,
    capture_check, effectiveness_key, simple_lifeleech, simple_poison, simple_recover, winners,
};
use crate::monster::{ItemDef, Status, StatusSubstitute, StatusTick, TechEffect, Technique};
use crate::state::{EntityId, MonsterId, SeenStatus};

/// Chance that a confused monster acts at random.
const CONFUSION_CHANCE: f64 = 0.5;

fn push_line(message: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    if !message.is_empty() {
        message.push('\n');
    }
    message.push_str(line);
}

impl Combat {
    pub(super) fn perform_action(
        &mut self,
        action: EnqueuedAction,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) -> Result<(), CombatError> {
        match (action.user, action.method) {
            (ActionUser::Monster(user), Method::Technique(technique)) => {
                self.use_technique(user, technique, action.target, host, rng);
            }
            (ActionUser::Trainer(trainer), Method::Item(item)) => {
                self.use_item(trainer, &item, action.target, host, rng);
            }
            (_, Method::Status(status)) => self.tick_status(&status, action.target, host),
            (user, method) => {
                debug!(?user, method = method.slug(), "action without a matching user");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Techniques
    // ========================================================================

    fn use_technique(
        &mut self,
        user: MonsterId,
        mut technique: Technique,
        mut target: MonsterId,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) {
        let Some(snapshot) = self.monster(user).cloned() else {
            return;
        };
        if snapshot.is_fainted() {
            return;
        }
        let Some(side) = self.side_index_of(user) else {
            return;
        };

        match snapshot.status.head().map(|status| status.substitute) {
            Some(StatusSubstitute::Skip) => technique = Technique::skip(),
            Some(StatusSubstitute::Confused) if rng.unit() < CONFUSION_CHANCE => {
                let usable: Vec<&Technique> =
                    snapshot.usable_moves().map(|(_, tech)| tech).collect();
                let field: Vec<MonsterId> = self
                    .sides
                    .iter()
                    .filter(|side| side.is_active())
                    .flat_map(|side| side.active_monsters().map(|monster| monster.id))
                    .collect();
                if let (Some(tech), Some(foe)) = (rng.pick(usable.len()), rng.pick(field.len())) {
                    technique = usable[tech].clone();
                    target = field[foe];
                }
            }
            _ => {}
        }

        if let Some(learned) = self
            .monster_mut(user)
            .and_then(|monster| monster.find_move_mut(&technique.slug))
        {
            learned.advance_round();
        }

        if technique.is_escape() {
            let exit = if technique.has_effect(|effect| matches!(effect, TechEffect::Forfeit)) {
                SideExit::Forfeited
            } else {
                SideExit::Ran
            };
            self.leave_combat(side, exit, &technique, host);
            return;
        }
        if technique.has_effect(|effect| matches!(effect, TechEffect::Swap)) {
            self.swap_monster(side, user, target, host);
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let locale = Arc::clone(&self.locale);
        let Some(struck) = self.monster_mut(target) else {
            return;
        };
        let result = apply_technique(&technique, &snapshot, struck, &catalog, rng);
        let target_name = struck.name.clone();
        let target_hp = struck.current_hp;
        if let Some(user_monster) = self.monster_mut(user) {
            if result.user_heal > 0 {
                user_monster.heal(result.user_heal);
            }
            if let Some(status) = result.user_status.clone() {
                user_monster.apply_status(status);
            }
        }

        let technique_name = locale.translate(&technique.slug);
        let mut message = locale.format(
            &technique.use_tech,
            &[
                ("user", &snapshot.name),
                ("name", &technique_name),
                ("target", &target_name),
            ],
        );
        if result.should_tackle {
            self.damage_map.record(user, target);
            host.play_animation(CombatAnimation::Tackle { user, target });
            host.play_animation(CombatAnimation::TakeDamage { target });
            host.play_animation(CombatAnimation::Hp {
                monster: target,
                current_hp: target_hp,
            });
            if let Some(key) = effectiveness_key(result.element_multiplier) {
                push_line(&mut message, &locale.translate(key));
            }
        } else {
            let key = if result.success {
                technique.use_success.as_deref()
            } else {
                technique.use_failure.as_deref()
            };
            if let Some(key) = key {
                push_line(&mut message, &locale.translate(key));
            }
        }
        for status in &result.statuses {
            let line = locale.format(
                "combat_status_given",
                &[("target", &target_name), ("status", &locale.translate(status))],
            );
            push_line(&mut message, &line);
        }

        host.alert(&message);
        if result.success {
            host.play_animation(CombatAnimation::Technique {
                slug: technique.slug.clone(),
                target,
            });
        }
        self.lock_for(self.config.combat.action);
    }

    /// Removes a side in one step: battlefield, queued actions and all.
    fn leave_combat(
        &mut self,
        side: usize,
        exit: SideExit,
        technique: &Technique,
        host: &mut dyn CombatHost,
    ) {
        let leaving = core::mem::take(&mut self.sides[side].in_play);
        for monster in &leaving {
            self.queue.remove_involving(*monster);
        }
        let trainer = self.sides[side].npc.id;
        self.queue.remove_by_user(ActionUser::Trainer(trainer));
        self.sides[side].exit = Some(exit);
        self.decisions.retain(|id| !leaving.contains(id));

        let npc = &self.sides[side].npc;
        let message = if npc.is_player() {
            self.locale
                .format(&technique.use_tech, &[("user", &npc.name)])
        } else {
            self.locale
                .format("combat_opponent_run", &[("user", &npc.name)])
        };
        info!(trainer = %trainer, ?exit, "side left combat");
        host.alert(&message);
        self.lock_for(self.config.combat.action);
    }

    fn swap_monster(
        &mut self,
        side: usize,
        original: MonsterId,
        replacement: MonsterId,
        host: &mut dyn CombatHost,
    ) {
        let party = &self.sides[side].npc.party;
        let (Some(old), Some(new)) = (party.get(original), party.get(replacement)) else {
            return;
        };
        let message = self.locale.format(
            "combat_swap",
            &[("user", &old.name), ("target", &new.name)],
        );

        let in_play = &mut self.sides[side].in_play;
        let Some(slot) = in_play.iter().position(|id| *id == original) else {
            return;
        };
        in_play[slot] = replacement;
        self.queue.rewrite_target(original, replacement);
        self.queue.remove_by_user(ActionUser::Monster(original));

        host.alert(&message);
        host.play_animation(CombatAnimation::Release {
            monster: replacement,
        });
        self.lock_for(self.config.combat.action);
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn use_item(
        &mut self,
        trainer: EntityId,
        item: &ItemDef,
        target: MonsterId,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) {
        let Some(side) = self.side_index_by_trainer(trainer) else {
            return;
        };
        let locale = Arc::clone(&self.locale);
        if self.sides[side].npc.inventory.remove(&item.slug, 1) == 0 {
            host.alert(&locale.translate("item_none_left"));
            return;
        }
        let Some(target_monster) = self.monster(target) else {
            return;
        };
        let target_name = target_monster.name.clone();
        let item_name = locale.translate(&item.slug);
        let mut message = locale.format(
            &item.use_item,
            &[
                ("user", &self.sides[side].npc.name),
                ("name", &item_name),
                ("target", &target_name),
            ],
        );

        if let Some(power) = item.capture_power() {
            let input = CaptureInput::for_target(target_monster, power);
            let roll = capture_check(&input, rng);
            debug!(
                target = %target,
                shakes = roll.shakes,
                captured = roll.captured,
                "capture roll"
            );
            host.play_animation(CombatAnimation::Capture {
                monster: target,
                shakes: roll.shakes,
                captured: roll.captured,
            });
            let action_time = roll.shakes as f32 + self.config.combat.capture_extra;
            if roll.captured {
                let gotcha = locale.format("gotcha", &[("name", &target_name)]);
                self.tasks.schedule(action_time, CombatTask::Alert(gotcha));
                self.tasks.schedule(
                    action_time + 0.5,
                    CombatTask::FinishCapture {
                        trainer,
                        monster: target,
                    },
                );
                self.capture_pending = true;
            } else if let Some(key) = item.use_failure.as_deref() {
                push_line(&mut message, &locale.translate(key));
            }
            host.alert(&message);
            self.lock_for(action_time);
            return;
        }

        let changed = self
            .monster_mut(target)
            .is_some_and(|monster| item.apply_to(monster));
        let key = if changed {
            item.use_success.as_deref()
        } else {
            item.use_failure.as_deref()
        };
        if let Some(key) = key {
            push_line(&mut message, &locale.translate(key));
        }
        if changed {
            if let Some(monster) = self.monster(target) {
                host.play_animation(CombatAnimation::Hp {
                    monster: target,
                    current_hp: monster.current_hp,
                });
            }
        }
        host.alert(&message);
        self.lock_for(self.config.combat.action);
    }

    pub(super) fn finish_capture(
        &mut self,
        trainer: EntityId,
        monster: MonsterId,
        host: &mut dyn CombatHost,
    ) {
        self.capture_pending = false;
        let from = self.side_index_of(monster);
        let to = self.side_index_by_trainer(trainer);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        let Some(mut caught) = self.sides[from].npc.party.remove(monster) else {
            return;
        };
        self.sides[from].in_play.retain(|id| *id != monster);
        self.queue.remove_involving(monster);

        caught.status.clear_conditions();
        let slug = caught.slug.clone();
        info!(monster = %monster, slug = %slug, trainer = %trainer, "monster captured");
        self.sides[to].npc.add_monster(caught);
        self.record_tuxepedia(slug, SeenStatus::Caught);

        self.outcome.captured = Some(monster);
        self.outcome.result = CombatResult::Captured;
        self.outcome.winner = Some(trainer);
        if let Some(player) = self.player_mut() {
            player.variables.set("battle_last_result", "captured");
        }

        self.phase = CombatPhase::EndCombat;
        self.history.push(self.phase);
        self.end_combat(host);
    }

    // ========================================================================
    // Status ticks
    // ========================================================================

    fn tick_status(&mut self, status: &Status, carrier: MonsterId, host: &mut dyn CombatHost) {
        let Some(monster) = self.monster(carrier) else {
            return;
        };
        if monster.is_fainted() || !monster.status.contains(&status.slug) {
            return;
        }
        let name = monster.name.clone();

        let link = status.link.and_then(|id| self.monster(id)).cloned();
        let Some(monster) = self.monster_mut(carrier) else {
            return;
        };
        let changed = match status.tick {
            StatusTick::None => 0,
            StatusTick::Poison => monster.take_damage(simple_poison(monster)),
            StatusTick::Recover => monster.heal(simple_recover(monster)),
            StatusTick::Lifeleech => match link.filter(|leech| !leech.is_fainted()) {
                Some(leech) => monster.take_damage(simple_lifeleech(&leech, monster)),
                None => 0,
            },
        };
        let current_hp = monster.current_hp;

        let mut expired = false;
        if let Some(live) = monster.status.get_mut(&status.slug) {
            live.nr_turn += 1;
            expired = live.is_expired();
        }
        if expired {
            monster.status.remove(&status.slug);
        }

        if status.tick == StatusTick::Lifeleech && changed > 0 {
            if let Some(leech) = status.link.and_then(|id| self.monster_mut(id)) {
                leech.heal(changed);
            }
        }

        let status_name = self.locale.translate(&status.slug);
        if changed > 0 {
            let message = self.locale.format(
                "combat_status_damage",
                &[("name", &name), ("status", &status_name)],
            );
            host.alert(&message);
            host.play_animation(CombatAnimation::Hp {
                monster: carrier,
                current_hp,
            });
            self.lock_for(self.config.combat.action);
        }
        if expired {
            let message = self.locale.format(
                "combat_status_wore_off",
                &[("name", &name), ("status", &status_name)],
            );
            host.alert(&message);
        }
    }

    // ========================================================================
    // Fainting
    // ========================================================================

    pub(super) fn check_party_hp(&mut self, host: &mut dyn CombatHost) -> Result<(), CombatError> {
        let fainted: Vec<MonsterId> = self
            .sides
            .iter()
            .flat_map(|side| side.in_play.iter().copied())
            .filter(|id| !self.knocked_out.contains(id))
            .filter(|id| self.monster(*id).is_some_and(|monster| monster.is_fainted()))
            .collect();
        for monster in fainted {
            self.knocked_out.insert(monster);
            self.queue.remove_involving(monster);
            self.decisions.retain(|id| *id != monster);
            self.faint_monster(monster, host)?;
        }
        Ok(())
    }

    /// Hands out experience and prize money for `loser`.
    fn faint_monster(
        &mut self,
        loser: MonsterId,
        host: &mut dyn CombatHost,
    ) -> Result<(), CombatError> {
        let Some(defeated) = self.monster_mut(loser) else {
            return Ok(());
        };
        defeated.faint();
        let defeated = defeated.clone();

        let attackers = self.damage_map.attackers_of(loser);
        let winner_side = attackers.first().and_then(|id| self.side_index_of(*id));
        let party_alive: Vec<MonsterId> = winner_side
            .map(|side| {
                self.sides[side]
                    .npc
                    .party
                    .awake_monsters()
                    .map(|monster| monster.id)
                    .collect()
            })
            .unwrap_or_default();

        let method = self.config.experience_method.clone();
        let total_hits = self.damage_map.hits_on(loser);
        let locale = Arc::clone(&self.locale);
        for winner in winners(loser, &self.damage_map, &method, &party_alive)? {
            let share = ExperienceShare {
                total_hits,
                winner_hits: self.damage_map.hits_by(winner, loser),
                party_alive: party_alive.len(),
            };
            let amount = award_experience(&defeated, share, &method)?;
            if amount == 0 {
                continue;
            }
            let Some(monster) = self.monster_mut(winner) else {
                continue;
            };
            let report = monster.give_experience(amount);
            let name = monster.name.clone();
            let level = monster.level;
            *self.outcome.experience.entry(winner).or_default() += amount;

            host.alert(&locale.format(
                "combat_gain_exp",
                &[("name", &name), ("xp", &amount.to_string())],
            ));
            if report.levels_gained > 0 {
                info!(monster = %winner, level, "level up");
                host.alert(&locale.format(
                    "combat_levelup",
                    &[("name", &name), ("level", &level.to_string())],
                ));
            }
            for technique in &report.learned {
                host.alert(&locale.format(
                    "combat_new_technique",
                    &[("name", &name), ("technique", &locale.translate(technique))],
                ));
            }
        }

        let player_won =
            winner_side.is_some_and(|side| self.sides[side].npc.is_player());
        if self.combat_type == CombatType::Trainer && player_won {
            let prize = u64::from(award_money(&defeated, &self.config.money_method)?);
            if let Some(player) = self.player_mut() {
                player.give_money(prize);
            }
            self.outcome.money_awarded += prize;
        }

        self.damage_map.forget(loser);
        Ok(())
    }

    pub(super) fn animate_party_status(&mut self, host: &mut dyn CombatHost) {
        let mut animated = false;
        for index in 0..self.sides.len() {
            let side = &self.sides[index];
            let fainted: Vec<(MonsterId, String)> = side
                .in_play
                .iter()
                .filter_map(|id| side.npc.party.get(*id))
                .filter(|monster| monster.is_fainted())
                .map(|monster| (monster.id, monster.name.clone()))
                .collect();
            for (monster, name) in fainted {
                host.alert(&self.locale.format("combat_fainted", &[("name", &name)]));
                host.play_animation(CombatAnimation::Faint { monster });
                self.sides[index].in_play.retain(|id| *id != monster);
                self.knocked_out.remove(&monster);
                animated = true;
            }
        }
        if animated {
            self.lock_for(self.config.combat.status_animation);
        }
    }
}
