//! Game session: the overworld, its scripted events and at most one combat.
//!
//! The session owns every piece of mutable game state. Each
//! [`Session::tick`] runs either the active combat or the event engine,
//! advances movement, and then starts any encounter that an event queued
//! during the tick.
use std::sync::Arc;

use tracing::{debug, info, warn};

use monster_content::MapData;
use monster_core::engine::{CombatOutcome, CombatResult, check_legal};
use monster_core::entity::MovementEvent;
use monster_core::event::{Button, EngineState};
use monster_core::formula::{ExperienceMethod, MoneyMethod};
use monster_core::world::{CombatRequest, Participant};
use monster_core::{
    Combat, CombatHost, ContentCatalog, Decision, Direction, EntityId, EventContext, EventEngine,
    EventHost, GameConfig, Localizer, MonsterId, Npc, Position, RngOracle, World,
};

use crate::error::{Result, SessionError};

/// Host surface of a session: combat presentation plus event dialogs.
pub trait GameHost: CombatHost + EventHost {}

impl<T: CombatHost + EventHost + ?Sized> GameHost for T {}

struct ActiveCombat {
    combat: Combat,
    /// NPCs taken out of the world for this combat.
    from_world: Vec<EntityId>,
}

pub struct Session {
    config: GameConfig,
    catalog: Arc<ContentCatalog>,
    locale: Arc<Localizer>,
    world: World,
    events: EventEngine,
    combat: Option<ActiveCombat>,
    rng: Box<dyn RngOracle>,
    /// Tiles the player arrived on during the previous tick.
    arrivals: Vec<Position>,
    last_outcome: Option<CombatOutcome>,
    ticks: u64,
}

impl Session {
    /// Creates a session around an existing world.
    ///
    /// # Errors
    ///
    /// Fails when the configured experience or money method is unknown, so a
    /// bad configuration is reported before the first encounter.
    pub fn new(
        world: World,
        catalog: Arc<ContentCatalog>,
        locale: Arc<Localizer>,
        config: GameConfig,
        rng: impl RngOracle + 'static,
    ) -> Result<Self> {
        ExperienceMethod::parse(&config.experience_method)?;
        MoneyMethod::parse(&config.money_method)?;

        let mut session = Self {
            config,
            catalog,
            locale,
            world,
            events: EventEngine::new(),
            combat: None,
            rng: Box::new(rng),
            arrivals: Vec::new(),
            last_outcome: None,
            ticks: 0,
        };
        session.apply_rates(EntityId::PLAYER);
        Ok(session)
    }

    /// Evaluate every condition of every event and keep a trace.
    pub fn with_debug_conditions(mut self, debug: bool) -> Self {
        self.events = std::mem::take(&mut self.events).with_debug(debug);
        self
    }

    /// Switches the world to `map`, spawns its NPCs and loads its events.
    pub fn enter_map(&mut self, name: &str, map: &MapData) -> Result<Vec<EntityId>> {
        if self.combat.is_some() {
            return Err(SessionError::CombatInProgress);
        }
        self.world.load_map(name, map.collision.clone());
        let spawned = map.spawn_npcs(&mut self.world, &self.catalog)?;
        for id in &spawned {
            self.apply_rates(*id);
        }
        self.events.load_events(map.events.iter().cloned());
        self.arrivals.clear();
        info!(
            map = name,
            npcs = spawned.len(),
            events = map.events.len(),
            "entered map"
        );
        Ok(spawned)
    }

    fn apply_rates(&mut self, id: EntityId) {
        let (walk, run) = (self.config.walk_rate, self.config.run_rate);
        if let Some(npc) = self.world.npc_mut(id) {
            npc.mover = npc.mover.clone().with_rates(walk, run);
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the session by `dt` seconds.
    pub fn tick<H: GameHost>(&mut self, dt: f32, host: &mut H) -> Result<()> {
        self.ticks += 1;

        if let Some(active) = self.combat.as_mut() {
            active.combat.update(dt, &mut *host, self.rng.as_mut())?;
            if active.combat.is_finished() {
                if let Some(active) = self.combat.take() {
                    self.finish_combat(active)?;
                }
            }
            return Ok(());
        }

        let arrivals = std::mem::take(&mut self.arrivals);
        let mut context = EventContext {
            world: &mut self.world,
            catalog: &self.catalog,
            locale: &self.locale,
            host: &mut *host,
        };
        self.events.update(dt, &mut context, &arrivals);

        for (id, event) in self.world.update_movement(dt) {
            match event {
                MovementEvent::Arrived { tile } if id.is_player() => self.arrivals.push(tile),
                MovementEvent::PathFailed { destination } => {
                    debug!(%id, %destination, "no path");
                }
                _ => {}
            }
        }

        if let Some(request) = self.world.take_pending_combat() {
            self.start_combat(request)?;
        }
        Ok(())
    }

    // ========================================================================
    // Encounters
    // ========================================================================

    /// Moves the requested participants into a new combat.
    ///
    /// Returns false when the encounter is not legal; everyone stays in the
    /// world in that case.
    fn start_combat(&mut self, request: CombatRequest) -> Result<bool> {
        let mut participants = Vec::with_capacity(request.participants.len());
        let mut from_world = Vec::new();
        for participant in request.participants {
            match participant {
                Participant::Npc(id) => match self.world.take_npc(id) {
                    Some(npc) => {
                        from_world.push(id);
                        participants.push(npc);
                    }
                    None => {
                        self.return_to_world(participants, &from_world);
                        return Err(SessionError::UnknownParticipant(id));
                    }
                },
                Participant::Wild(holder) => participants.push(*holder),
            }
        }

        if !check_legal(&participants) {
            warn!(
                combat_type = %request.combat_type,
                "encounter skipped, a side has nobody able to fight"
            );
            self.return_to_world(participants, &from_world);
            return Ok(false);
        }

        let combat = Combat::new(
            participants,
            request.combat_type,
            request.environment,
            &self.config,
            Arc::clone(&self.catalog),
            Arc::clone(&self.locale),
        )?;
        info!(
            combat_type = %combat.combat_type(),
            environment = combat.environment(),
            sides = combat.sides().len(),
            "combat started"
        );
        self.combat = Some(ActiveCombat { combat, from_world });
        Ok(true)
    }

    fn return_to_world(&mut self, participants: Vec<Npc>, from_world: &[EntityId]) {
        for npc in participants {
            if from_world.contains(&npc.id) {
                self.world.return_npc(npc);
            }
        }
    }

    /// Applies the outcome and gives the participants back to the world.
    fn finish_combat(&mut self, active: ActiveCombat) -> Result<()> {
        let ActiveCombat {
            mut combat,
            from_world,
        } = active;
        let outcome = combat.take_outcome();
        let mut participants = combat.into_participants();

        for npc in participants.iter_mut().filter(|npc| npc.is_player()) {
            for record in npc.party.evolve_pending(&self.catalog)? {
                info!(
                    monster = %record.monster,
                    from = %record.from,
                    into = %record.into,
                    "monster evolved"
                );
            }
            let lost = outcome
                .as_ref()
                .is_some_and(|outcome| outcome.result == CombatResult::Lost);
            if lost && npc.variables.get("battle_lost_faint") == Some("true") {
                npc.party.restore();
                info!("party restored after defeat");
            }
        }

        if let Some(outcome) = &outcome {
            info!(
                result = %outcome.result,
                money = outcome.money_awarded,
                captured = outcome.captured.is_some(),
                "combat finished"
            );
        }
        self.return_to_world(participants, &from_world);
        self.last_outcome = outcome;
        Ok(())
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handles a button press.
    ///
    /// During combat the action button closes the result prompt. Outside of
    /// combat the press goes to the event engine, which starts interact
    /// events. Returns true when the press was consumed.
    pub fn press<H: GameHost>(&mut self, button: Button, host: &mut H) -> bool {
        if let Some(active) = self.combat.as_mut() {
            return button == Button::A && active.combat.acknowledge(&mut *host);
        }
        let mut context = EventContext {
            world: &mut self.world,
            catalog: &self.catalog,
            locale: &self.locale,
            host: &mut *host,
        };
        self.events.press(button, &mut context, &self.arrivals)
    }

    pub fn release(&mut self, button: Button) {
        self.events.release(button);
    }

    /// Starts or stops the player walking in `direction`.
    pub fn move_player(&mut self, direction: Option<Direction>) -> Result<()> {
        let player = self.world.player_mut().ok_or(SessionError::NoPlayer)?;
        player.mover.set_move_direction(direction);
        Ok(())
    }

    /// Sends the player along the shortest route to `tile`.
    pub fn walk_player_to(&mut self, tile: Position) -> Vec<MovementEvent> {
        self.world.pathfind(EntityId::PLAYER, tile)
    }

    pub fn submit_decision<H: GameHost>(&mut self, host: &mut H, decision: Decision) -> Result<()> {
        let active = self.combat.as_mut().ok_or(SessionError::NotInCombat)?;
        active.combat.submit_decision(&mut *host, decision)?;
        Ok(())
    }

    pub fn submit_replacement<H: GameHost>(
        &mut self,
        host: &mut H,
        trainer: EntityId,
        monster: MonsterId,
    ) -> Result<()> {
        let active = self.combat.as_mut().ok_or(SessionError::NotInCombat)?;
        active.combat.submit_replacement(&mut *host, trainer, monster)?;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self) -> Option<&Npc> {
        self.world.player()
    }

    pub fn events(&self) -> &EventEngine {
        &self.events
    }

    pub fn combat(&self) -> Option<&Combat> {
        self.combat.as_ref().map(|active| &active.combat)
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    /// Button the event engine waits to see released, if any.
    pub fn awaited_button(&self) -> Option<Button> {
        match self.events.state() {
            EngineState::WaitingForInput { button } => Some(button),
            _ => None,
        }
    }

    pub fn last_outcome(&self) -> Option<&CombatOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn take_last_outcome(&mut self) -> Option<CombatOutcome> {
        self.last_outcome.take()
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rng_mut(&mut self) -> &mut dyn RngOracle {
        self.rng.as_mut()
    }
}
