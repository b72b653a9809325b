//! Catalog lookup errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors raised when content referenced by slug is missing.
///
/// These indicate broken content or scripts, not player mistakes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("monster '{0}' not found")]
    UnknownMonster(String),

    #[error("technique '{0}' not found")]
    UnknownTechnique(String),

    #[error("item '{0}' not found")]
    UnknownItem(String),

    #[error("status '{0}' not found")]
    UnknownStatus(String),

    #[error("environment '{0}' not found")]
    UnknownEnvironment(String),
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use CatalogError::*;
        match self {
            UnknownMonster(_) => "CATALOG_UNKNOWN_MONSTER",
            UnknownTechnique(_) => "CATALOG_UNKNOWN_TECHNIQUE",
            UnknownItem(_) => "CATALOG_UNKNOWN_ITEM",
            UnknownStatus(_) => "CATALOG_UNKNOWN_STATUS",
            UnknownEnvironment(_) => "CATALOG_UNKNOWN_ENVIRONMENT",
        }
    }
}
