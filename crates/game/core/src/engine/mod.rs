//! Phase-machine combat engine.
//!
//! [`Combat`] owns every participant for the length of one encounter. The host
//! calls [`Combat::update`] once per frame; the engine drains its delayed
//! tasks, then advances at most one phase once nothing visual is pending.
//! Human choices arrive through [`Combat::submit_decision`] and
//! [`Combat::submit_replacement`], and the result screen is closed with
//! [`Combat::acknowledge`].
//!
//! Everything the engine needs from the outside world is passed in: content
//! and strings as shared handles, randomness as an [`RngOracle`], and all
//! presentation through a [`CombatHost`].
mod ai;
mod decision;
mod errors;
mod host;
mod outcome;
mod phase;
mod queue;
mod resolve;
mod task;

#[cfg(test)]
mod testing;

pub use ai::{AiChoice, CombatAi, FleeAi, RandomAi, SimpleAi, decide};
pub use decision::Decision;
pub use errors::{CombatError, DecisionError};
pub use host::{CombatAnimation, CombatHost, CombatMenu, HostCall, RecordingHost};
pub use outcome::{BattleRecord, CombatOutcome, CombatResult};
pub use phase::{CombatPhase, PhaseView, determine_phase};
pub use queue::{ActionQueue, ActionUser, EnqueuedAction, Method};
pub use task::{TaskQueue, TaskTag};

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::entity::{AiKind, Controller, Npc};
use crate::env::{ContentCatalog, Localizer, RngOracle};
use crate::formula::{DamageMap, ExperienceMethod, MoneyMethod};
use crate::monster::{Monster, Technique};
use crate::state::{EntityId, MonsterId, SeenStatus};

/// Kind of encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatType {
    #[strum(to_string = "wild", serialize = "monster")]
    #[cfg_attr(feature = "serde", serde(alias = "monster"))]
    Wild,
    Trainer,
    /// Safari-style encounter: no fighting, wild monsters may flee.
    Park,
}

/// Why a side left before being defeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideExit {
    Ran,
    Forfeited,
}

/// One participant and its monsters on the battlefield.
#[derive(Clone, Debug)]
pub struct Side {
    pub npc: Npc,
    /// Battlefield order; every id belongs to `npc.party`.
    pub in_play: Vec<MonsterId>,
    pub max_positions: usize,
    pub exit: Option<SideExit>,
}

impl Side {
    fn new(npc: Npc, max_positions: usize) -> Self {
        Self {
            npc,
            in_play: Vec::new(),
            max_positions,
            exit: None,
        }
    }

    /// Still in the encounter: not fled and with a conscious monster.
    pub fn is_active(&self) -> bool {
        self.exit.is_none() && !self.npc.party.is_defeated()
    }

    /// Open battlefield slots. A lone survivor only ever fills one.
    pub fn positions_available(&self) -> usize {
        self.max_positions
            .min(self.npc.party.awake_count())
            .saturating_sub(self.in_play.len())
    }

    /// Conscious monsters on the battlefield.
    pub fn active_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.in_play
            .iter()
            .filter_map(|id| self.npc.party.get(*id))
            .filter(|monster| !monster.is_fainted())
    }

    fn decides_by_menu(&self) -> bool {
        matches!(self.npc.controller, Controller::Human | Controller::Remote)
    }
}

/// Delayed work queued by phase entries and action resolution.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CombatTask {
    IntroDone,
    CheckPartyHp,
    AnimatePartyStatus,
    PushWaitForInput,
    Alert(String),
    FinishCapture { trainer: EntityId, monster: MonsterId },
}

/// A running encounter.
pub struct Combat {
    combat_type: CombatType,
    environment: String,
    config: GameConfig,
    catalog: Arc<ContentCatalog>,
    locale: Arc<Localizer>,
    sides: Vec<Side>,

    phase: CombatPhase,
    started: bool,
    round: u32,
    history: Vec<CombatPhase>,

    queue: ActionQueue,
    decisions: VecDeque<MonsterId>,
    awaiting: Option<MonsterId>,
    replacements: Vec<EntityId>,
    damage_map: DamageMap,
    tasks: TaskQueue<CombatTask>,

    /// Seconds before the phase machine may advance again.
    lock: f32,
    intro_done: bool,
    wait_prompt: bool,
    acknowledged: bool,
    capture_pending: bool,
    knocked_out: HashSet<MonsterId>,

    outcome: CombatOutcome,
    finished: bool,
}

/// Whether `participants` can start an encounter.
///
/// Needs at least two sides, each with a conscious monster.
pub fn check_legal<'a>(participants: impl IntoIterator<Item = &'a Npc>) -> bool {
    let mut count = 0;
    for npc in participants {
        if npc.party.is_defeated() {
            return false;
        }
        count += 1;
    }
    count >= 2
}

impl Combat {
    /// Sets up an encounter. Nothing is shown until the first [`Combat::update`].
    ///
    /// # Errors
    ///
    /// [`CombatError::NotLegal`] when [`check_legal`] fails, and
    /// [`CombatError::Formula`] when the configured reward methods are unknown.
    pub fn new(
        participants: Vec<Npc>,
        combat_type: CombatType,
        environment: impl Into<String>,
        config: &GameConfig,
        catalog: Arc<ContentCatalog>,
        locale: Arc<Localizer>,
    ) -> Result<Self, CombatError> {
        if !check_legal(&participants) {
            return Err(CombatError::NotLegal);
        }
        ExperienceMethod::parse(&config.experience_method)?;
        MoneyMethod::parse(&config.money_method)?;

        let positions = config
            .battle_positions
            .clamp(1, GameConfig::MAX_BATTLE_POSITIONS);
        let sides = participants
            .into_iter()
            .map(|mut npc| {
                if combat_type != CombatType::Trainer && !npc.is_player() {
                    for monster in npc.party.monsters_mut() {
                        monster.owner = None;
                    }
                }
                Side::new(npc, positions)
            })
            .collect();

        Ok(Self {
            combat_type,
            environment: environment.into(),
            config: config.clone(),
            catalog,
            locale,
            sides,
            phase: CombatPhase::Begin,
            started: false,
            round: 0,
            history: Vec::new(),
            queue: ActionQueue::new(),
            decisions: VecDeque::new(),
            awaiting: None,
            replacements: Vec::new(),
            damage_map: DamageMap::new(),
            tasks: TaskQueue::new(),
            lock: 0.0,
            intro_done: false,
            wait_prompt: false,
            acknowledged: false,
            capture_pending: false,
            knocked_out: HashSet::new(),
            outcome: CombatOutcome::new(CombatResult::Draw),
            finished: false,
        })
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the encounter by `dt` seconds.
    ///
    /// Due tasks always run. The phase machine only moves when no capture is
    /// resolving, the action lock has expired, no task is pending and the
    /// host reports it is idle.
    pub fn update(
        &mut self,
        dt: f32,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) -> Result<(), CombatError> {
        if self.finished {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            self.enter_phase(CombatPhase::Begin, host, rng);
        }

        self.lock = (self.lock - dt).max(0.0);
        for task in self.tasks.advance(dt) {
            self.run_task(task, host)?;
            if self.finished {
                return Ok(());
            }
        }

        if self.capture_pending || self.lock > 0.0 || !self.tasks.is_empty() || host.is_busy() {
            return Ok(());
        }

        if let Some(next) = determine_phase(self.phase, &self.view()) {
            debug!(from = %self.phase, to = %next, round = self.round, "combat phase change");
            self.enter_phase(next, host, rng);
        }
        self.update_phase(host, rng)
    }

    fn view(&self) -> PhaseView {
        let active: Vec<&Side> = self.sides.iter().filter(|side| side.is_active()).collect();
        PhaseView {
            intro_done: self.intro_done,
            positions_filled: self.replacements.is_empty()
                && active.iter().all(|side| side.positions_available() == 0),
            remaining_sides: active.len(),
            queued_actions: self.queue.len(),
            active_monsters: active
                .iter()
                .map(|side| side.active_monsters().count())
                .sum(),
            decisions_pending: self.awaiting.is_some() || !self.decisions.is_empty(),
            acknowledged: self.acknowledged,
        }
    }

    fn enter_phase(
        &mut self,
        phase: CombatPhase,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) {
        self.phase = phase;
        self.history.push(phase);

        match phase {
            CombatPhase::Begin => {
                host.play_animation(CombatAnimation::Open);
                self.tasks.schedule(self.config.combat.intro, CombatTask::IntroDone);
            }
            CombatPhase::Ready | CombatPhase::PreAction | CombatPhase::ResolveMatch => {}
            CombatPhase::Housekeeping => {
                self.round += 1;
                for index in 0..self.sides.len() {
                    self.fill_battlefield(index, host);
                }
                self.record_last_seen();
            }
            CombatPhase::Decision => self.collect_decisions(rng),
            CombatPhase::Action => self.queue.sort(),
            CombatPhase::PostAction => self.enqueue_status_ticks(),
            CombatPhase::RanAway | CombatPhase::DrawMatch => self.conclude(host),
            CombatPhase::EndCombat => self.end_combat(host),
        }
    }

    fn update_phase(
        &mut self,
        host: &mut dyn CombatHost,
        rng: &mut dyn RngOracle,
    ) -> Result<(), CombatError> {
        match self.phase {
            CombatPhase::Decision => {
                if self.awaiting.is_none() {
                    self.ask_next_decision(host);
                }
            }
            CombatPhase::Action | CombatPhase::PostAction => {
                if let Some(action) = self.queue.pop() {
                    self.perform_action(action, host, rng)?;
                    let timing = self.config.combat;
                    self.tasks.schedule(timing.hp_check, CombatTask::CheckPartyHp);
                    self.tasks
                        .schedule(timing.status_animation, CombatTask::AnimatePartyStatus);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn run_task(&mut self, task: CombatTask, host: &mut dyn CombatHost) -> Result<(), CombatError> {
        match task {
            CombatTask::IntroDone => self.intro_done = true,
            CombatTask::CheckPartyHp => self.check_party_hp(host)?,
            CombatTask::AnimatePartyStatus => self.animate_party_status(host),
            CombatTask::PushWaitForInput => {
                self.wait_prompt = true;
                host.push_menu(CombatMenu::WaitForInput);
            }
            CombatTask::Alert(message) => host.alert(&message),
            CombatTask::FinishCapture { trainer, monster } => {
                self.finish_capture(trainer, monster, host);
            }
        }
        Ok(())
    }

    fn lock_for(&mut self, seconds: f32) {
        self.lock = self.lock.max(seconds);
    }

    // ========================================================================
    // Phase entries
    // ========================================================================

    fn fill_battlefield(&mut self, index: usize, host: &mut dyn CombatHost) {
        let side = &self.sides[index];
        if !side.is_active() {
            return;
        }
        let open = side.positions_available();
        if open == 0 {
            return;
        }

        if side.decides_by_menu() && self.round > 1 {
            let trainer = side.npc.id;
            if !self.replacements.contains(&trainer) {
                self.replacements.push(trainer);
                host.alert(&self.locale.translate("combat_replacement"));
                host.push_menu(CombatMenu::Replacement { trainer });
            }
            return;
        }

        let candidates: Vec<MonsterId> = side
            .npc
            .party
            .awake_monsters()
            .map(|monster| monster.id)
            .filter(|id| !side.in_play.contains(id))
            .take(open)
            .collect();
        for monster in candidates {
            self.add_to_battlefield(index, monster, host);
        }
    }

    fn add_to_battlefield(&mut self, index: usize, monster: MonsterId, host: &mut dyn CombatHost) {
        let side = &mut self.sides[index];
        side.in_play.push(monster);
        let Some(added) = side.npc.party.get(monster) else {
            return;
        };
        let name = added.name.clone();
        let slug = added.slug.clone();
        let trainer = side.npc.name.clone();
        let own = side.npc.is_player();

        let message = if own {
            self.locale.format("combat_call_tuxemon", &[("name", &name)])
        } else if self.combat_type == CombatType::Trainer {
            self.locale.format(
                "combat_opponent_call_tuxemon",
                &[("name", &name), ("user", &trainer)],
            )
        } else {
            self.locale.format("combat_wild_appeared", &[("name", &name)])
        };
        host.alert(&message);
        host.play_animation(CombatAnimation::Release { monster });

        if !own {
            self.record_tuxepedia(slug, SeenStatus::Seen);
        }
        self.lock_for(self.config.combat.release);
    }

    fn record_tuxepedia(&mut self, slug: String, status: SeenStatus) {
        if let Some(player) = self.player_mut() {
            player.tuxepedia.record(slug.clone(), status);
        }
        self.outcome.tuxepedia.push((slug, status));
    }

    fn record_last_seen(&mut self) {
        let Some(seen) = self
            .sides
            .iter()
            .filter(|side| !side.npc.is_player())
            .find_map(|side| side.in_play.first().and_then(|id| side.npc.party.get(*id)))
        else {
            return;
        };
        let fields = [
            ("battle_last_monster_name", seen.name.clone()),
            ("battle_last_monster_level", seen.level.to_string()),
            (
                "battle_last_monster_type",
                seen.types.first().map(ToString::to_string).unwrap_or_default(),
            ),
            ("battle_last_monster_category", seen.category.clone()),
            ("battle_last_monster_shape", seen.shape.clone()),
        ];
        if let Some(player) = self.player_mut() {
            for (key, value) in fields {
                player.variables.set(key, value);
            }
        }
    }

    fn collect_decisions(&mut self, rng: &mut dyn RngOracle) {
        for side in &mut self.sides {
            let in_play = side.in_play.clone();
            for id in in_play {
                if let Some(monster) = side.npc.party.get_mut(id) {
                    monster.recharge_moves();
                }
            }
        }

        let mut chosen = Vec::new();
        for side in self.sides.iter().filter(|side| side.is_active()) {
            let kind = match side.npc.controller {
                Controller::Ai(_) if self.combat_type == CombatType::Park => AiKind::Flee,
                Controller::Ai(kind) => kind,
                Controller::Human | Controller::Remote => {
                    self.decisions
                        .extend(side.active_monsters().map(|monster| monster.id));
                    continue;
                }
            };
            for monster in side.active_monsters() {
                let opponents = self.opponents(monster.id);
                let action = match decide(kind, monster, &opponents, rng) {
                    AiChoice::Technique { technique, target } => {
                        EnqueuedAction::technique(monster.id, technique, target)
                    }
                    AiChoice::Run => {
                        EnqueuedAction::technique(monster.id, Technique::run(), monster.id)
                    }
                    AiChoice::Skip => {
                        EnqueuedAction::technique(monster.id, Technique::skip(), monster.id)
                    }
                };
                chosen.push(action);
            }
        }
        for action in chosen {
            self.queue.enqueue(action);
        }
    }

    fn ask_next_decision(&mut self, host: &mut dyn CombatHost) {
        while let Some(id) = self.decisions.pop_front() {
            let Some(monster) = self.monster(id) else {
                continue;
            };
            if monster.is_fainted() || self.queue.has_action_for(id) {
                continue;
            }
            let message = self
                .locale
                .format("combat_monster_choice", &[("name", &monster.name)]);
            self.awaiting = Some(id);
            host.alert(&message);
            host.push_menu(if self.combat_type == CombatType::Park {
                CombatMenu::ParkAction { monster: id }
            } else {
                CombatMenu::Action { monster: id }
            });
            return;
        }
    }

    fn enqueue_status_ticks(&mut self) {
        let mut ticks = Vec::new();
        for side in self.sides.iter().filter(|side| side.is_active()) {
            for monster in side.active_monsters() {
                for status in monster.status.iter().filter(|status| !status.is_faint()) {
                    ticks.push(EnqueuedAction::status(status.clone(), monster.id));
                }
            }
        }
        for action in ticks {
            self.queue.enqueue(action);
        }
    }

    fn determine_result(&self) -> CombatResult {
        if self.phase == CombatPhase::DrawMatch {
            return CombatResult::Draw;
        }
        let perspective = self.player_index().unwrap_or(0);
        match self.sides[perspective].exit {
            Some(SideExit::Ran) => return CombatResult::RanAway,
            Some(SideExit::Forfeited) => return CombatResult::Lost,
            None => {}
        }
        if self.sides.iter().any(|side| side.exit == Some(SideExit::Ran)) {
            return CombatResult::RanAway;
        }
        if self.sides[perspective].is_active() {
            CombatResult::Won
        } else {
            CombatResult::Lost
        }
    }

    fn conclude(&mut self, host: &mut dyn CombatHost) {
        let result = self.determine_result();
        let winner = self
            .sides
            .iter()
            .find(|side| side.is_active())
            .map(|side| (side.npc.id, side.npc.slug.clone()));
        self.outcome.result = result;
        self.outcome.winner = winner.as_ref().map(|(id, _)| *id);

        if let Some(index) = self.player_index() {
            let lost_by_faint =
                result == CombatResult::Lost && self.sides[index].npc.party.is_defeated();
            let variables = &mut self.sides[index].npc.variables;
            variables.set("battle_last_result", result.to_string());
            if lost_by_faint {
                variables.set("battle_lost_faint", "true");
            }
            if let Some((_, slug)) = &winner {
                variables.set("battle_last_winner", slug.clone());
            }
        }

        let key = match result {
            CombatResult::Won => Some("combat_victory"),
            CombatResult::Lost => Some("combat_defeat"),
            CombatResult::Draw => Some("combat_draw"),
            CombatResult::RanAway | CombatResult::Captured => None,
        };
        if let Some(key) = key {
            host.alert(&self.locale.translate(key));
        }

        let timing = self.config.combat;
        self.tasks
            .schedule(timing.result_prompt, CombatTask::PushWaitForInput);
        self.lock_for(timing.result_lock);
    }

    fn end_combat(&mut self, host: &mut dyn CombatHost) {
        for side in &mut self.sides {
            side.in_play.clear();
            for monster in side.npc.party.monsters_mut() {
                monster.end_combat();
            }
        }
        self.queue.clear();
        self.tasks.clear();
        self.decisions.clear();
        self.awaiting = None;
        self.capture_pending = false;

        host.fade_music(self.config.combat.music_fade_ms);
        host.pop_all_menus();

        let opponent = self
            .sides
            .iter()
            .find(|side| !side.npc.is_player())
            .map(|side| side.npc.slug.clone())
            .unwrap_or_default();
        if let Some(player) = self.player_mut() {
            player.set_party_status();
        }
        self.outcome.battle_records.push(BattleRecord {
            opponent,
            result: self.outcome.result,
            rounds: self.round,
        });
        self.finished = true;
        info!(
            result = %self.outcome.result,
            rounds = self.round,
            environment = %self.environment,
            "combat ended"
        );
    }

    // ========================================================================
    // Acknowledgement
    // ========================================================================

    /// Closes the result prompt. Returns `false` when no prompt is open.
    pub fn acknowledge(&mut self, host: &mut dyn CombatHost) -> bool {
        if !self.wait_prompt {
            return false;
        }
        self.wait_prompt = false;
        self.acknowledged = true;
        host.pop_menu();
        true
    }

    /// True while the result prompt waits for [`Combat::acknowledge`].
    pub fn is_waiting_for_input(&self) -> bool {
        self.wait_prompt
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn combat_type(&self) -> CombatType {
        self.combat_type
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Housekeeping rounds entered so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Every phase entered, in order.
    pub fn phase_history(&self) -> &[CombatPhase] {
        &self.history
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn damage_map(&self) -> &DamageMap {
        &self.damage_map
    }

    /// Monster whose decision menu is open.
    pub fn awaiting(&self) -> Option<MonsterId> {
        self.awaiting
    }

    /// Trainers that must pick a replacement before the round can start.
    pub fn pending_replacements(&self) -> &[EntityId] {
        &self.replacements
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.sides.iter().find_map(|side| side.npc.party.get(id))
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.sides
            .iter_mut()
            .find_map(|side| side.npc.party.get_mut(id))
    }

    pub fn side_of_monster(&self, id: MonsterId) -> Option<&Side> {
        self.side_index_of(id).map(|index| &self.sides[index])
    }

    pub fn player_side(&self) -> Option<&Side> {
        self.player_index().map(|index| &self.sides[index])
    }

    /// Conscious battlefield monsters on every other active side.
    pub fn opponents(&self, monster: MonsterId) -> Vec<&Monster> {
        let own = self.side_index_of(monster);
        self.sides
            .iter()
            .enumerate()
            .filter(|(index, side)| Some(*index) != own && side.is_active())
            .flat_map(|(_, side)| side.active_monsters())
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Final report; `None` until the encounter has ended.
    pub fn outcome(&self) -> Option<&CombatOutcome> {
        self.finished.then_some(&self.outcome)
    }

    pub fn take_outcome(&mut self) -> Option<CombatOutcome> {
        if !self.finished {
            return None;
        }
        Some(core::mem::replace(
            &mut self.outcome,
            CombatOutcome::new(CombatResult::Draw),
        ))
    }

    /// Hands the participants back to the world.
    pub fn into_participants(self) -> Vec<Npc> {
        self.sides.into_iter().map(|side| side.npc).collect()
    }

    fn side_index_of(&self, monster: MonsterId) -> Option<usize> {
        self.sides
            .iter()
            .position(|side| side.npc.party.contains(monster))
    }

    fn side_index_by_trainer(&self, trainer: EntityId) -> Option<usize> {
        self.sides.iter().position(|side| side.npc.id == trainer)
    }

    fn player_index(&self) -> Option<usize> {
        self.sides.iter().position(|side| side.npc.is_player())
    }

    fn player_mut(&mut self) -> Option<&mut Npc> {
        self.sides
            .iter_mut()
            .map(|side| &mut side.npc)
            .find(|npc| npc.is_player())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::env::ScriptedRng;
    use crate::formula::FormulaError;

    #[test]
    fn single_side_is_not_legal() {
        let player = player_with([monster(1, "rockitten")]);
        assert!(!check_legal([&player]));

        let mut fainted = monster(2, "bamboon");
        fainted.faint();
        let wild = wild_with(fainted);
        assert!(!check_legal([&player, &wild]));
    }

    #[test]
    fn unknown_reward_method_rejects_setup() {
        let config = GameConfig {
            experience_method: "osmosis".to_owned(),
            ..test_config()
        };
        let participants = vec![
            player_with([monster(1, "rockitten")]),
            wild_with(monster(2, "bamboon")),
        ];
        let result = Combat::new(
            participants,
            CombatType::Wild,
            "grass",
            &config,
            Arc::new(ContentCatalog::new()),
            Arc::new(Localizer::new(Localizer::DEFAULT_LOCALE)),
        );
        assert!(matches!(
            result,
            Err(CombatError::Formula(FormulaError::UnsupportedMethod { .. }))
        ));
    }

    #[test]
    fn combat_type_parses_monster_alias() {
        assert_eq!("monster".parse::<CombatType>(), Ok(CombatType::Wild));
        assert_eq!("trainer".parse::<CombatType>(), Ok(CombatType::Trainer));
        assert_eq!(CombatType::Wild.to_string(), "wild");
    }

    #[test]
    fn housekeeping_fills_battlefield_and_records_sighting() {
        let mut combat = wild_combat();
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![0]);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.phase() == CombatPhase::Decision
        }));
        assert_eq!(combat.round(), 1);
        for side in combat.sides() {
            assert_eq!(side.in_play.len(), 1);
        }
        let player = combat.player_side().map(|side| &side.npc);
        let player = player.expect("player side");
        assert_eq!(player.tuxepedia.status("bamboon"), Some(SeenStatus::Seen));
        assert_eq!(
            player.variables.get("battle_last_monster_name"),
            Some("bamboon")
        );
        assert!(host.alerts().any(|alert| alert == "combat_wild_appeared"));
        assert_eq!(
            host.top_menu(),
            Some(&CombatMenu::Action {
                monster: MonsterId(1)
            })
        );
    }

    #[test]
    fn human_defeat_skips_housekeeping_on_the_way_out() {
        let fragile = monster(1, "rockitten").with_hp(1);
        let mut combat = trainer_combat(
            player_with([fragile]),
            trainer_with(EntityId(7), [monster(2, "bamboon")]),
        );
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![0]);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| c.awaiting().is_some()));
        combat
            .submit_decision(
                &mut host,
                Decision::Technique {
                    monster: MonsterId(1),
                    technique: "tackle".to_owned(),
                    target: MonsterId(2),
                },
            )
            .expect("decision accepted");

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.is_waiting_for_input()
        }));
        assert!(combat.acknowledge(&mut host));
        assert!(run_until(&mut combat, &mut host, &mut rng, Combat::is_finished));

        let history = combat.phase_history();
        let action = history
            .iter()
            .position(|phase| *phase == CombatPhase::Action)
            .expect("action phase");
        assert_eq!(
            &history[action..],
            &[
                CombatPhase::Action,
                CombatPhase::PostAction,
                CombatPhase::ResolveMatch,
                CombatPhase::RanAway,
                CombatPhase::EndCombat,
            ]
        );
        let visits = history
            .iter()
            .filter(|phase| **phase == CombatPhase::Housekeeping)
            .count();
        assert_eq!(visits, 1);

        let outcome = combat.outcome().expect("finished");
        assert_eq!(outcome.result, CombatResult::Lost);
        assert_eq!(outcome.winner, Some(EntityId(7)));
        assert!(outcome.experience.contains_key(&MonsterId(2)));
        let player = &combat.player_side().expect("player side").npc;
        assert_eq!(player.variables.get("battle_last_result"), Some("lost"));
        assert_eq!(player.variables.get("battle_lost_faint"), Some("true"));
        assert_eq!(player.variables.get("battle_last_winner"), Some("rival"));
    }

    #[test]
    fn running_from_wild_encounter_ends_as_ran() {
        let mut combat = wild_combat();
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![u32::MAX]);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| c.awaiting().is_some()));
        combat
            .submit_decision(&mut host, Decision::Run { monster: MonsterId(1) })
            .expect("run accepted");
        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.is_waiting_for_input()
        }));
        assert_eq!(combat.phase(), CombatPhase::RanAway);
        combat.acknowledge(&mut host);
        assert!(run_until(&mut combat, &mut host, &mut rng, Combat::is_finished));

        let outcome = combat.outcome().expect("finished");
        assert_eq!(outcome.result, CombatResult::RanAway);
        assert!(combat.queue().is_empty());
        let player = &combat.player_side().expect("player side").npc;
        assert_eq!(player.variables.get("battle_last_result"), Some("ran"));
        assert!(host.calls.contains(&HostCall::PopAllMenus));
    }

    fn sturdy(id: u32, slug: &str) -> Monster {
        monster(id, slug).with_hp(200)
    }

    #[test]
    fn double_battle_swaps_both_slots_before_any_technique() {
        let player = player_with([
            sturdy(1, "rockitten"),
            sturdy(3, "nut"),
            sturdy(5, "bamboon"),
            sturdy(6, "fruitera"),
        ]);
        let trainer = trainer_with(EntityId(7), [sturdy(2, "sumobug"), sturdy(4, "dollfin")]);
        let mut combat = double_combat(player, trainer);
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![0]);

        for (monster, replacement) in [(1, 5), (3, 6)] {
            let monster = MonsterId(monster);
            assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
                c.awaiting() == Some(monster)
            }));
            combat
                .submit_decision(
                    &mut host,
                    Decision::Swap {
                        monster,
                        replacement: MonsterId(replacement),
                    },
                )
                .expect("swap accepted");
        }
        assert_eq!(combat.queue().len(), 4);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.phase() == CombatPhase::ResolveMatch
        }));
        let player = combat.player_side().expect("player side");
        assert_eq!(player.in_play, vec![MonsterId(5), MonsterId(6)]);

        let first_tackle = host
            .calls
            .iter()
            .position(|call| matches!(call, HostCall::Animation(CombatAnimation::Tackle { .. })))
            .expect("techniques were used");
        for monster in [MonsterId(5), MonsterId(6)] {
            let release = HostCall::Animation(CombatAnimation::Release { monster });
            let released = host.calls.iter().position(|call| *call == release);
            assert!(released.is_some_and(|index| index < first_tackle));
        }

        let damage = combat.damage_map();
        assert_eq!(damage.hits_on(MonsterId(1)) + damage.hits_on(MonsterId(3)), 0);
        assert_eq!(damage.hits_on(MonsterId(5)) + damage.hits_on(MonsterId(6)), 2);
    }

    #[test]
    fn fainted_battlefield_monsters_are_never_chosen() {
        let player = player_with([
            sturdy(1, "rockitten"),
            sturdy(3, "nut"),
            sturdy(5, "bamboon"),
        ]);
        let trainer = trainer_with(EntityId(7), [sturdy(2, "sumobug"), sturdy(4, "dollfin")]);
        let mut combat = double_combat(player, trainer);
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![0]);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.phase() == CombatPhase::Housekeeping
        }));
        for id in [MonsterId(1), MonsterId(2)] {
            if let Some(monster) = combat.monster_mut(id) {
                monster.faint();
            }
        }

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| c.awaiting().is_some()));
        assert_eq!(combat.awaiting(), Some(MonsterId(3)));
        let queued: Vec<_> = combat.queue().iter().collect();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].user, ActionUser::Monster(MonsterId(4)));
        assert_eq!(queued[0].target, MonsterId(3));

        let at_fainted = Decision::Technique {
            monster: MonsterId(3),
            technique: "tackle".to_owned(),
            target: MonsterId(2),
        };
        assert_eq!(
            combat.submit_decision(&mut host, at_fainted),
            Err(DecisionError::InvalidTarget(MonsterId(2)))
        );
        let swap_to_fainted = Decision::Swap {
            monster: MonsterId(3),
            replacement: MonsterId(1),
        };
        assert_eq!(
            combat.submit_decision(&mut host, swap_to_fainted),
            Err(DecisionError::Fainted(MonsterId(1)))
        );
        combat
            .submit_decision(
                &mut host,
                Decision::Technique {
                    monster: MonsterId(3),
                    technique: "tackle".to_owned(),
                    target: MonsterId(4),
                },
            )
            .expect("decision accepted");

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            !c.pending_replacements().is_empty()
        }));
        assert_eq!(combat.round(), 2);
        let trainer = combat.side_of_monster(MonsterId(4)).expect("trainer side");
        assert_eq!(trainer.in_play, vec![MonsterId(4)]);
        assert_eq!(
            combat.submit_replacement(&mut host, EntityId::PLAYER, MonsterId(1)),
            Err(DecisionError::Fainted(MonsterId(1)))
        );
        combat
            .submit_replacement(&mut host, EntityId::PLAYER, MonsterId(5))
            .expect("replacement accepted");
        let player = combat.player_side().expect("player side");
        assert_eq!(player.in_play, vec![MonsterId(3), MonsterId(5)]);
    }

    #[test]
    fn trainer_victory_pays_the_player() {
        let mut weak = monster(2, "bamboon").with_hp(1);
        weak.money_modifier = 3.0;
        let mut combat = trainer_combat(
            player_with([monster(1, "rockitten").with_hp(100)]),
            trainer_with(EntityId(7), [weak]),
        );
        let mut host = RecordingHost::new();
        let mut rng = ScriptedRng::new(vec![0]);

        assert!(run_until(&mut combat, &mut host, &mut rng, |c| c.awaiting().is_some()));
        combat
            .submit_decision(
                &mut host,
                Decision::Technique {
                    monster: MonsterId(1),
                    technique: "tackle".to_owned(),
                    target: MonsterId(2),
                },
            )
            .expect("decision accepted");
        assert!(run_until(&mut combat, &mut host, &mut rng, |c| {
            c.is_waiting_for_input()
        }));
        combat.acknowledge(&mut host);
        assert!(run_until(&mut combat, &mut host, &mut rng, Combat::is_finished));

        let outcome = combat.outcome().expect("finished");
        assert_eq!(outcome.result, CombatResult::Won);
        assert_eq!(outcome.money_awarded, 15);
        let player = &combat.player_side().expect("player side").npc;
        assert_eq!(player.money, 15);
        assert_eq!(outcome.battle_records[0].opponent, "rival");
    }
}
