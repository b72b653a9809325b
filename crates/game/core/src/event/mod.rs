//! Map scripting: conditions, actions and the engine that runs them.
mod action;
mod condition;
mod engine;

pub use action::{
    ActionError, ActionFlow, Button, EventContext, EventHost, MapAction, MathOperation,
};
pub use condition::{Area, Comparison, Condition, ConditionContext, ConditionKind, Operator};
pub use engine::{ConditionTrace, EngineState, EventEngine, EventKind, MapEvent};
