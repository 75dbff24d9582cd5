use thiserror::Error;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Caller-side sanitization failures; the engine itself never rejects input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{flag} must be a finite number")]
    NotFinite { flag: &'static str },
    #[error("{flag} must be >= 0")]
    Negative { flag: &'static str },
    #[error("{flag} must be > 0")]
    NotPositive { flag: &'static str },
    #[error("{flag} must be between 0 and 100")]
    PercentOutOfRange { flag: &'static str },
    #[error("{flag} must not be empty")]
    Empty { flag: &'static str },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
