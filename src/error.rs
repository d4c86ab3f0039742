//! Error types for Synheart Somn

use thiserror::Error;

/// Errors that can occur during resampling or tracking
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
