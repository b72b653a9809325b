//! Session errors.

use monster_core::env::CatalogError;
use monster_core::{CombatError, DecisionError, EntityId, ErrorSeverity, FormulaError, GameError};

/// Errors surfaced while driving a [`crate::Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("combat participant {0} is not in the world")]
    UnknownParticipant(EntityId),

    #[error("no combat is running")]
    NotInCombat,

    #[error("cannot change maps during combat")]
    CombatInProgress,

    #[error("the world has no player")]
    NoPlayer,

    #[error(transparent)]
    Content(#[from] anyhow::Error),
}

impl GameError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Combat(error) => error.severity(),
            Self::Decision(error) => error.severity(),
            Self::Formula(error) => error.severity(),
            Self::Catalog(error) => error.severity(),
            Self::UnknownParticipant(_) | Self::NoPlayer => ErrorSeverity::Internal,
            Self::NotInCombat | Self::CombatInProgress => ErrorSeverity::Validation,
            Self::Content(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Combat(error) => error.error_code(),
            Self::Decision(error) => error.error_code(),
            Self::Formula(error) => error.error_code(),
            Self::Catalog(error) => error.error_code(),
            Self::UnknownParticipant(_) => "SESSION_UNKNOWN_PARTICIPANT",
            Self::NotInCombat => "SESSION_NOT_IN_COMBAT",
            Self::CombatInProgress => "SESSION_COMBAT_IN_PROGRESS",
            Self::NoPlayer => "SESSION_NO_PLAYER",
            Self::Content(_) => "SESSION_CONTENT",
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
