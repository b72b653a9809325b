//! Common error infrastructure for monster-core.
//!
//! This module provides shared types and traits used across all error types in monster-core.
//! Domain-specific errors (e.g., `FormulaError`, `DecisionError`) are defined in their
//! respective modules alongside the operations that raise them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error type with specific variants
//! - **Severity Classification**: Errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by their recoverability and expected handling:
/// - **Recoverable**: Temporary conditions that may succeed on retry or with alternative choices
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors, usually broken content or configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative choice.
    ///
    /// Examples: technique recharging, nothing to use the item on
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown monster, target not on the battlefield
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: queued action refers to a monster no party owns
    Internal,

    /// Fatal error - cannot continue.
    ///
    /// Examples: unknown reward method named in configuration
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

/// Common trait for all monster-core errors.
///
/// This trait provides a uniform interface for error classification across all
/// error types in the crate.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unclassified;

    impl core::fmt::Display for Unclassified {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("unclassified")
        }
    }

    impl GameError for Unclassified {
        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Internal
        }
    }

    #[test]
    fn error_code_defaults_to_the_type_name() {
        assert!(Unclassified.error_code().ends_with("Unclassified"));
        assert_eq!(Unclassified.severity().as_str(), "internal");
    }
}
