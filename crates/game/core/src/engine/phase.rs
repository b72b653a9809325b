//! Combat phases and the pure transition test between them.

use strum::{Display, IntoStaticStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CombatPhase {
    Begin,
    Ready,
    Housekeeping,
    Decision,
    PreAction,
    Action,
    PostAction,
    ResolveMatch,
    /// One side is left, by fleeing or by defeating the others.
    RanAway,
    /// Every side was defeated in the same round.
    DrawMatch,
    EndCombat,
}

/// Facts the transition test reads. Built fresh each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseView {
    pub intro_done: bool,
    /// No active side has an open battlefield slot.
    pub positions_filled: bool,
    pub remaining_sides: usize,
    pub queued_actions: usize,
    pub active_monsters: usize,
    /// A human decision is still open or waiting to be asked.
    pub decisions_pending: bool,
    pub acknowledged: bool,
}

/// Next phase after `phase`, or `None` to stay.
///
/// Side-effect free; every entry action lives in the engine.
pub fn determine_phase(phase: CombatPhase, view: &PhaseView) -> Option<CombatPhase> {
    use CombatPhase::*;

    match phase {
        Begin => view.intro_done.then_some(Ready),
        Ready => Some(Housekeeping),
        Housekeeping => view.positions_filled.then_some(Decision),
        Decision => {
            if view.remaining_sides <= 1 {
                Some(RanAway)
            } else if !view.decisions_pending && view.queued_actions >= view.active_monsters {
                Some(PreAction)
            } else {
                None
            }
        }
        PreAction => Some(Action),
        Action => (view.queued_actions == 0).then_some(PostAction),
        PostAction => (view.queued_actions == 0).then_some(ResolveMatch),
        ResolveMatch => match view.remaining_sides {
            0 => Some(DrawMatch),
            1 => Some(RanAway),
            _ => Some(Housekeeping),
        },
        RanAway | DrawMatch => view.acknowledged.then_some(EndCombat),
        EndCombat => None,
    }
}
