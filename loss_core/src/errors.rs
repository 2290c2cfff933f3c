//! # Error Types
//!
//! Structured error types for loss_core. Every failure the engine can report
//! is a variant of [`LossError`], carrying enough context for a host
//! application to show a status-center style message or to react
//! programmatically through [`LossError::error_code`].
//!
//! ## Example
//!
//! ```rust
//! use loss_core::errors::{LossError, LossResult};
//!
//! fn validate_span(span: f64) -> LossResult<()> {
//!     if span <= 0.0 {
//!         return Err(LossError::invalid_input(
//!             "span_length",
//!             span.to_string(),
//!             "Span must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_span(-3.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for loss_core operations
pub type LossResult<T> = Result<T, LossError>;

/// Structured error type for loss analysis operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LossError {
    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The project is configured in a way the engine cannot analyze
    /// (for example, a loss method other than time-step)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Anchor-set root finding did not converge
    #[error("Anchor set solution did not converge for duct {duct} at the {end} end after {iterations} iterations")]
    NonConvergence {
        duct: usize,
        end: String,
        iterations: usize,
    },

    /// Internal forces do not balance the applied section forces
    #[error("Equilibrium mismatch in interval {interval} at {location:.4}: external ({p_external:.6}, {m_external:.6}) internal ({p_internal:.6}, {m_internal:.6})")]
    EquilibriumMismatch {
        interval: usize,
        location: f64,
        p_external: f64,
        p_internal: f64,
        m_external: f64,
        m_internal: f64,
    },

    /// The requested girder does not exist in the bridge
    #[error("Girder not found: group {group}, girder {girder}")]
    GirderNotFound { group: usize, girder: usize },

    /// The requested interval is beyond the schedule
    #[error("Interval {interval} is out of range (schedule has {count} intervals)")]
    IntervalOutOfRange { interval: usize, count: usize },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LossError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LossError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        LossError::MissingField {
            field: field.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        LossError::Configuration {
            message: message.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LossError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        LossError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        LossError::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LossError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LossError::InvalidInput { .. } => "INVALID_INPUT",
            LossError::MissingField { .. } => "MISSING_FIELD",
            LossError::Configuration { .. } => "CONFIGURATION",
            LossError::NonConvergence { .. } => "NON_CONVERGENCE",
            LossError::EquilibriumMismatch { .. } => "EQUILIBRIUM_MISMATCH",
            LossError::GirderNotFound { .. } => "GIRDER_NOT_FOUND",
            LossError::IntervalOutOfRange { .. } => "INTERVAL_OUT_OF_RANGE",
            LossError::FileError { .. } => "FILE_ERROR",
            LossError::FileLocked { .. } => "FILE_LOCKED",
            LossError::SerializationError { .. } => "SERIALIZATION_ERROR",
            LossError::VersionMismatch { .. } => "VERSION_MISMATCH",
            LossError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for LossError {
    fn from(e: serde_json::Error) -> Self {
        LossError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = LossError::invalid_input("span_length", "-5.0", "Span must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: LossError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LossError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(LossError::configuration("refined").error_code(), "CONFIGURATION");
        let err = LossError::NonConvergence {
            duct: 0,
            end: "start".to_string(),
            iterations: 100,
        };
        assert_eq!(err.error_code(), "NON_CONVERGENCE");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_configuration_message() {
        let err = LossError::configuration("Time-step analysis requires the time-step loss method");
        assert_eq!(
            err.to_string(),
            "Configuration error: Time-step analysis requires the time-step loss method"
        );
    }
}
