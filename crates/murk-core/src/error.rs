//! Error types and exit code constants for murk.
//!
//! This module provides a unified error type (`MurkError`) that bridges
//! domain-specific errors from different subsystems (loading, emission)
//! into a common format suitable for the CLI boundary.
//!
//! ## Exit Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Load errors (bundle unreadable, malformed, inconsistent)
//! - `4`: Emit errors (failed to write output)
//! - `5`: Input packages carry type-check diagnostics; the engine refuses to run
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Stable exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Load errors (bundle not found, malformed, overlapping file bases).
    LoadError = 3,
    /// Emit errors (failed to write output files or copy assets).
    EmitError = 4,
    /// Input packages carry diagnostics from the upstream type checker.
    InputErrors = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ExitCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the CLI boundary.
///
/// Subsystem errors are converted into this type before being reported.
/// The engine itself never returns errors: precondition violations abort,
/// and a failed rename candidate is not an error (the driver retries).
#[derive(Debug, Error)]
pub enum MurkError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A bundle could not be loaded.
    #[error("cannot load bundle {path}: {reason}")]
    LoadError { path: String, reason: String },

    /// Input packages carry diagnostics from the upstream type checker.
    #[error("{count} error(s) reported by the type checker; refusing to rename")]
    InputErrors { count: usize },

    /// Failed to write an output file or copy an asset.
    #[error("emit error at {path}: {message}")]
    EmitError { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl MurkError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        MurkError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        MurkError::InternalError {
            message: message.into(),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            MurkError::InvalidArguments { .. } => ExitCode::InvalidArguments,
            MurkError::LoadError { .. } => ExitCode::LoadError,
            MurkError::InputErrors { .. } => ExitCode::InputErrors,
            MurkError::EmitError { .. } => ExitCode::EmitError,
            MurkError::InternalError { .. } => ExitCode::InternalError,
        }
    }
}

impl From<io::Error> for MurkError {
    fn from(err: io::Error) -> Self {
        MurkError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod exit_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_2() {
            let err = MurkError::invalid_args("missing required flag");
            assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
            assert_eq!(err.exit_code().code(), 2);
        }

        #[test]
        fn load_error_maps_to_3() {
            let err = MurkError::LoadError {
                path: "pkg.json".to_string(),
                reason: "truncated".to_string(),
            };
            assert_eq!(err.exit_code().code(), 3);
        }

        #[test]
        fn input_errors_map_to_5() {
            let err = MurkError::InputErrors { count: 3 };
            assert_eq!(err.exit_code().code(), 5);
        }

        #[test]
        fn internal_error_maps_to_10() {
            let err = MurkError::internal("unexpected state");
            assert_eq!(err.exit_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn input_errors_display() {
            let err = MurkError::InputErrors { count: 2 };
            assert_eq!(
                err.to_string(),
                "2 error(s) reported by the type checker; refusing to rename"
            );
        }

        #[test]
        fn emit_error_display() {
            let err = MurkError::EmitError {
                path: "out/a.go".to_string(),
                message: "exists".to_string(),
            };
            assert_eq!(err.to_string(), "emit error at out/a.go: exists");
        }
    }
}
