//! Per-map event scheduler.
//!
//! Every tick the engine evaluates the conditions of each loaded event and
//! starts the ones that pass, then runs the actions of started events in
//! order. An action may pause the whole engine for a number of seconds or
//! until a button is released; while paused no conditions are evaluated.

use std::sync::Arc;

use tracing::{debug, error};

use super::action::{ActionFlow, Button, EventContext, MapAction};
use super::condition::{Condition, ConditionContext};
use crate::state::Position;

/// When an event is considered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    /// Checked every tick.
    #[default]
    Event,
    /// Checked once after the map loads, then discarded.
    Init,
    /// Checked only when the action button is pressed.
    Interact,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapEvent {
    pub id: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: EventKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Condition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<MapAction>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineState {
    Running,
    Waiting { remaining: f32 },
    WaitingForInput { button: Button },
}

/// One condition result recorded in debug mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionTrace {
    pub event: u32,
    pub condition: &'static str,
    pub passed: bool,
}

#[derive(Clone, Debug)]
struct RunningEvent {
    event: Arc<MapEvent>,
    next_action: usize,
}

#[derive(Clone, Debug)]
pub struct EventEngine {
    events: Vec<Arc<MapEvent>>,
    running: Vec<RunningEvent>,
    state: EngineState,
    init_pending: bool,
    debug: bool,
    trace: Vec<ConditionTrace>,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEngine {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            running: Vec::new(),
            state: EngineState::Running,
            init_pending: false,
            debug: false,
            trace: Vec::new(),
        }
    }

    /// Evaluates every condition instead of stopping at the first failure and
    /// keeps the results for [`EventEngine::condition_trace`].
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replaces the loaded events, e.g. after a map change.
    pub fn load_events(&mut self, events: impl IntoIterator<Item = MapEvent>) {
        self.events = events.into_iter().map(Arc::new).collect();
        self.running.clear();
        self.state = EngineState::Running;
        self.init_pending = true;
    }

    pub fn events(&self) -> impl Iterator<Item = &MapEvent> {
        self.events.iter().map(|event| event.as_ref())
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self, id: u32) -> bool {
        self.running.iter().any(|running| running.event.id == id)
    }

    /// True while an event has actions left or the engine is paused.
    pub fn is_busy(&self) -> bool {
        !self.running.is_empty() || self.state != EngineState::Running
    }

    /// Condition results of the last check, only filled in debug mode.
    pub fn condition_trace(&self) -> &[ConditionTrace] {
        &self.trace
    }

    /// Advances the engine by one tick.
    ///
    /// `player_arrivals` holds the tiles the player finished a step on since
    /// the previous tick.
    pub fn update(
        &mut self,
        dt: f32,
        context: &mut EventContext<'_>,
        player_arrivals: &[Position],
    ) {
        match self.state {
            EngineState::WaitingForInput { .. } => return,
            EngineState::Waiting { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.state = EngineState::Waiting { remaining };
                    return;
                }
                self.state = EngineState::Running;
            }
            EngineState::Running => {}
        }

        // A paused event resumes before anything new is considered.
        if !self.run_events(context) {
            return;
        }

        self.trace.clear();
        if self.init_pending {
            self.init_pending = false;
            self.start_matching(EventKind::Init, context, player_arrivals);
            self.events.retain(|event| event.kind != EventKind::Init);
        }
        self.start_matching(EventKind::Event, context, player_arrivals);
        self.run_events(context);
    }

    /// Handles a button press. The action button checks interact events.
    ///
    /// Returns true when an interact event was started.
    pub fn press(
        &mut self,
        button: Button,
        context: &mut EventContext<'_>,
        player_arrivals: &[Position],
    ) -> bool {
        if button != Button::A || self.state != EngineState::Running {
            return false;
        }
        self.trace.clear();
        let started = self.start_matching(EventKind::Interact, context, player_arrivals);
        if started > 0 {
            self.run_events(context);
        }
        started > 0
    }

    /// Releasing the awaited button resumes the engine.
    pub fn release(&mut self, button: Button) {
        if self.state == (EngineState::WaitingForInput { button }) {
            self.state = EngineState::Running;
        }
    }

    /// Starts each not-yet-running event of `kind` whose conditions pass.
    fn start_matching(
        &mut self,
        kind: EventKind,
        context: &EventContext<'_>,
        player_arrivals: &[Position],
    ) -> usize {
        let conditions = ConditionContext {
            world: &*context.world,
            player_arrivals,
        };
        let mut started = 0;
        for event in &self.events {
            if event.kind != kind || self.running.iter().any(|r| r.event.id == event.id) {
                continue;
            }
            if check_conditions(event, &conditions, self.debug, &mut self.trace) {
                debug!(event = event.id, name = %event.name, "event started");
                self.running.push(RunningEvent {
                    event: Arc::clone(event),
                    next_action: 0,
                });
                started += 1;
            }
        }
        started
    }

    /// Runs started events in order until one pauses the engine.
    ///
    /// Returns false when the engine was paused.
    fn run_events(&mut self, context: &mut EventContext<'_>) -> bool {
        while let Some(running) = self.running.first_mut() {
            while let Some(action) = running.event.actions.get(running.next_action) {
                running.next_action += 1;
                let flow = match action.execute(context) {
                    Ok(flow) => flow,
                    Err(err) => {
                        error!(
                            action = action.name(),
                            event = running.event.id,
                            error = %err,
                            "event action failed"
                        );
                        ActionFlow::Continue
                    }
                };
                match flow {
                    ActionFlow::Continue => {}
                    ActionFlow::Wait(seconds) => {
                        self.state = EngineState::Waiting { remaining: seconds };
                        return false;
                    }
                    ActionFlow::WaitForInput(button) => {
                        self.state = EngineState::WaitingForInput { button };
                        return false;
                    }
                }
            }
            self.running.remove(0);
        }
        true
    }
}

fn check_conditions(
    event: &MapEvent,
    context: &ConditionContext<'_>,
    debug: bool,
    trace: &mut Vec<ConditionTrace>,
) -> bool {
    if !debug {
        return event
            .conditions
            .iter()
            .all(|condition| condition.evaluate(context));
    }
    let mut all = true;
    for condition in &event.conditions {
        let passed = condition.evaluate(context);
        trace.push(ConditionTrace {
            event: event.id,
            condition: condition.name(),
            passed,
        });
        all &= passed;
    }
    all
}
