//! Telemetry for matkv
//!
//! Structured logging via `tracing`, configured once per process.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};

use thiserror::Error;

/// Telemetry error types
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Bad logging configuration
    #[error("Logging error: {0}")]
    Logging(String),

    /// Subscriber could not be installed
    #[error("Init error: {0}")]
    Init(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;
