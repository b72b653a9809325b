//! Formula errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors raised by the reward formulas.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// A reward method name that no formula implements.
    ///
    /// Raised when the award is computed, never silently defaulted.
    #[error("A formula for {kind} method '{name}' is not implemented")]
    UnsupportedMethod { kind: &'static str, name: String },
}

impl FormulaError {
    pub fn unsupported(kind: &'static str, name: &str) -> Self {
        Self::UnsupportedMethod {
            kind,
            name: name.to_owned(),
        }
    }
}

impl GameError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedMethod { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedMethod { .. } => "FORMULA_UNSUPPORTED_METHOD",
        }
    }
}
