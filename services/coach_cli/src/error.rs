//! services/coach_cli/src/error.rs
//!
//! Defines the primary error type for the coach client.

use crate::config::ConfigError;
use coach_core::{PortError, TurnError, ValidationError};

/// The primary error type for the `coach_cli` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the coach backend port.
    #[error("Coach backend error: {0}")]
    Port(#[from] PortError),

    /// A CSV upload was rejected as a whole.
    #[error("Upload rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Turn(#[from] TurnError),

    /// The workout library file could not be used.
    #[error("Workout library error: {0}")]
    Library(String),

    /// Represents a standard Input/Output error (e.g., reading an upload or the console).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
