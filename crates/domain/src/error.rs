//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`IncubatorError`] via `From`, so callers can match on the failure class
//! (link, parse, command, profile, supervisor) without string inspection.

use std::time::Duration;

use crate::actuator::Command;
use crate::profile::Species;

/// Boxed source error produced by an adapter (serial port, database, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the incubator controller.
#[derive(Debug, thiserror::Error)]
pub enum IncubatorError {
    /// The serial port could not be opened.
    #[error("serial link unavailable")]
    LinkUnavailable(#[source] BoxError),

    /// A sensor line could not be parsed into a reading.
    #[error("malformed sensor reading")]
    MalformedReading(#[from] ReadingParseError),

    /// Writing an actuator command to the link failed.
    #[error("actuator command {command} failed")]
    CommandFailed {
        /// The command that was not delivered.
        command: Command,
        /// Underlying transport failure.
        #[source]
        source: BoxError,
    },

    /// The profile source has no setpoints for the requested species.
    #[error("no profile configured for {species}")]
    NoProfile {
        /// The species that was looked up.
        species: Species,
    },

    /// The automatic control loop did not acknowledge cancellation in time.
    #[error("control loop did not stop within {timeout:?}")]
    ShutdownTimeout {
        /// The shutdown budget that elapsed.
        timeout: Duration,
    },

    /// Input or invariant validation failed.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

/// Validation failures for control-surface inputs and configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown species {0:?}")]
    UnknownSpecies(String),

    #[error("unknown actuator {0:?}")]
    UnknownActuator(String),

    #[error("unknown actuator action {0:?}")]
    UnknownAction(String),

    #[error("unknown control mode {0:?}")]
    UnknownMode(String),

    /// Manual commands are refused while the automatic loop owns the actuators.
    #[error("manual actuator control is disabled in automatic mode")]
    AutomaticModeActive,

    /// A configured `[min, max]` range is empty or not finite.
    #[error("invalid {name} range {min}..={max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    /// A configured duration must be non-zero.
    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),
}

/// Why a raw sensor line was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ReadingParseError {
    #[error("empty line")]
    Empty,

    #[error("expected 2 fields, got {actual}")]
    FieldCount { actual: usize },

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("invalid JSON payload")]
    Json(#[source] serde_json::Error),

    /// No line terminator within `limit` bytes, usually a baud rate mismatch.
    #[error("line exceeds {limit} bytes")]
    TooLong { limit: usize },
}
