//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (`AreaError`, `CombatError`, `Rejection`,
//! `CallbackError`) live next to the subsystem that produces them. This module
//! provides the shared classification they all implement.
//!
//! # Design Principles
//!
//! - **Type Safety**: each subsystem has its own error type with specific variants
//! - **No Faults for Rules**: ineligibility is a value (`Rejection`), never a panic
//! - **Severity Classification**: errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same action may succeed later (target moved, zone changed)
/// - **Validation**: the request itself is not permitted and should not be retried
/// - **Internal**: a collaborator misbehaved (script stack exhausted, hook failed)
/// - **Fatal**: the combat definition is misconfigured and cannot resolve at all
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: target standing in a protection zone, caster on another floor
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: attacking yourself, attacking an unattackable creature
    Validation,

    /// Internal error - a collaborator failed.
    ///
    /// Examples: scripting stack overflow, malformed callback results
    Internal,

    /// Fatal error - combat definition cannot be resolved.
    ///
    /// Examples: area direction never configured, malformed area template
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

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or misconfiguration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatFault: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Fatal.as_str(), "fatal");
    }
}
