//! # Error Types
//!
//! Custom error types for PPM Rover using `thiserror`.

use thiserror::Error;

/// Main error type for PPM Rover
#[derive(Debug, Error)]
pub enum PpmRoverError {
    /// Output sink errors
    #[error("output sink error: {0}")]
    Output(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for PPM Rover
pub type Result<T> = std::result::Result<T, PpmRoverError>;
