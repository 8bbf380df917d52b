//! Error types.
//!
//! - [`ClipError`]: structural failures raised by the clipping core. These are
//!   deterministic (bad interval, not enough data around a line, ...), so the
//!   core never retries; callers decide whether to skip or abort.
//! - [`AppError`]: what the binary reports, carrying a process exit code.

use std::path::Path;

use thiserror::Error;

/// Failures raised by the clipping core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    #[error(
        "Invalid clip interval ({lower}, {upper}): lower must be finite and strictly less than upper."
    )]
    InvalidInterval { lower: f64, upper: f64 },

    #[error("Clip request has {count} boundaries; boundaries must come in lower/upper pairs.")]
    UnpairedBoundary { count: usize },

    #[error(
        "Insufficient fit data around ({lower}, {upper}): {reason} ({available} fit samples, {required} required)."
    )]
    InsufficientData {
        lower: f64,
        upper: f64,
        available: usize,
        required: usize,
        reason: String,
    },

    #[error(
        "No samples fall inside the window ({}, {}) around ({lower}, {upper}).",
        .lower - .margin,
        .upper + .margin
    )]
    EmptyWindow { lower: f64, upper: f64, margin: f64 },

    #[error("Invalid clip configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid spectrum: {0}")]
    InvalidSpectrum(String),
}

impl ClipError {
    /// True for malformed intervals and unpaired boundary lists.
    pub fn is_invalid_interval(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval { .. } | Self::UnpairedBoundary { .. }
        )
    }

    /// Exit code used when this error ends a CLI run.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInterval { .. }
            | Self::UnpairedBoundary { .. }
            | Self::InvalidConfig(_) => 2,
            Self::InsufficientData { .. }
            | Self::EmptyWindow { .. }
            | Self::InvalidSpectrum(_) => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Exit code 2 error for a failed file operation, e.g. `file("read spectrum", path, e)`.
    pub fn file(action: &str, path: &Path, err: impl std::fmt::Display) -> Self {
        Self::new(2, format!("Failed to {action} '{}': {err}", path.display()))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ClipError> for AppError {
    fn from(err: ClipError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_errors_are_grouped() {
        let reversed = ClipError::InvalidInterval {
            lower: 2.0,
            upper: 1.0,
        };
        let empty = ClipError::EmptyWindow {
            lower: 1.0,
            upper: 2.0,
            margin: 1.0,
        };
        let unpaired = ClipError::UnpairedBoundary { count: 3 };
        assert!(unpaired.is_invalid_interval());
        assert!(reversed.is_invalid_interval());
        assert!(!empty.is_invalid_interval());
    }

    #[test]
    fn clip_error_maps_to_exit_code() {
        let err: AppError = ClipError::EmptyWindow {
            lower: 10.0,
            upper: 20.0,
            margin: 5.0,
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("(5, 25)"), "got: {err}");
    }
}
