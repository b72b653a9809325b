//! Error types for the combat engine.

use crate::env::CatalogError;
use crate::error::{ErrorSeverity, GameError};
use crate::formula::FormulaError;
use crate::state::{EntityId, MonsterId};

/// A player choice the engine refused.
///
/// The decision stays open; the host shows [`DecisionError::message_key`]
/// and lets the player choose again.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("combat is not collecting decisions")]
    NotAcceptingDecisions,

    #[error("monster {0} is not the one being asked")]
    NotAwaiting(MonsterId),

    #[error("monster {monster} does not know '{technique}'")]
    UnknownTechnique { monster: MonsterId, technique: String },

    #[error("technique '{0}' is still recharging")]
    Recharging(String),

    #[error("monster {0} is not a valid target")]
    InvalidTarget(MonsterId),

    #[error("trainer {trainer} has no '{item}' left")]
    MissingItem { trainer: EntityId, item: String },

    #[error("item '{0}' cannot be used in combat")]
    NotUsableHere(String),

    #[error("monster {0} belongs to a trainer and cannot be captured")]
    CannotCapture(MonsterId),

    #[error("cannot run from a trainer battle")]
    CannotRun,

    #[error("park battles only allow balls, items and running")]
    NotInPark,

    #[error("monster {0} has fainted")]
    Fainted(MonsterId),

    #[error("monster {0} is already in play")]
    AlreadyActive(MonsterId),

    #[error("monster {0} is not in the party")]
    NotInParty(MonsterId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl DecisionError {
    /// Localization key of the message shown to the player.
    pub fn message_key(&self) -> &'static str {
        use DecisionError::*;
        match self {
            NotAcceptingDecisions | NotAwaiting(_) => "combat_wait",
            UnknownTechnique { .. } | Catalog(_) => "combat_cannot_use",
            Recharging(_) => "combat_recharging",
            InvalidTarget(_) => "combat_target_invalid",
            MissingItem { .. } => "item_none_left",
            NotUsableHere(_) => "item_cannot_use_here",
            CannotCapture(_) => "combat_cannot_capture_trainer",
            CannotRun => "combat_cannot_run_trainer",
            NotInPark => "combat_park_not_allowed",
            Fainted(_) => "combat_fainted",
            AlreadyActive(_) => "combat_isactive",
            NotInParty(_) => "combat_target_invalid",
        }
    }
}

impl GameError for DecisionError {
    fn severity(&self) -> ErrorSeverity {
        use DecisionError::*;
        match self {
            NotAcceptingDecisions | NotAwaiting(_) => ErrorSeverity::Internal,
            Recharging(_) | MissingItem { .. } | CannotRun | Fainted(_) | AlreadyActive(_) => {
                ErrorSeverity::Recoverable
            }
            UnknownTechnique { .. }
            | InvalidTarget(_)
            | NotUsableHere(_)
            | CannotCapture(_)
            | NotInPark
            | NotInParty(_) => ErrorSeverity::Validation,
            Catalog(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use DecisionError::*;
        match self {
            NotAcceptingDecisions => "DECISION_NOT_ACCEPTING",
            NotAwaiting(_) => "DECISION_NOT_AWAITING",
            UnknownTechnique { .. } => "DECISION_UNKNOWN_TECHNIQUE",
            Recharging(_) => "DECISION_RECHARGING",
            InvalidTarget(_) => "DECISION_INVALID_TARGET",
            MissingItem { .. } => "DECISION_MISSING_ITEM",
            NotUsableHere(_) => "DECISION_NOT_USABLE_HERE",
            CannotCapture(_) => "DECISION_CANNOT_CAPTURE",
            CannotRun => "DECISION_CANNOT_RUN",
            NotInPark => "DECISION_NOT_IN_PARK",
            Fainted(_) => "DECISION_FAINTED",
            AlreadyActive(_) => "DECISION_ALREADY_ACTIVE",
            NotInParty(_) => "DECISION_NOT_IN_PARTY",
            Catalog(error) => error.error_code(),
        }
    }
}

/// Failures that stop the encounter from resolving.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// Fewer than two sides, or a side without a conscious monster.
    #[error("participants are not legal to battle")]
    NotLegal,

    #[error("monster {0} is not part of this combat")]
    UnknownMonster(MonsterId),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotLegal => ErrorSeverity::Validation,
            Self::UnknownMonster(_) => ErrorSeverity::Internal,
            Self::Formula(error) => error.severity(),
            Self::Catalog(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotLegal => "COMBAT_NOT_LEGAL",
            Self::UnknownMonster(_) => "COMBAT_UNKNOWN_MONSTER",
            Self::Formula(error) => error.error_code(),
            Self::Catalog(error) => error.error_code(),
        }
    }
}
