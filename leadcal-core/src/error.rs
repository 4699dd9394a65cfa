//! Error types for leadcal.

use thiserror::Error;

/// Errors that can occur in leadcal operations.
#[derive(Error, Debug)]
pub enum LeadcalError {
    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Local event store error: {0}")]
    LocalStore(String),

    #[error("Calendar provider error: {0}")]
    Provider(String),

    #[error("Calendar is not ready: {0}")]
    InvalidState(String),

    #[error("Event '{0}' comes from a remote calendar and is read-only")]
    ReadOnlyEvent(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for leadcal operations.
pub type LeadcalResult<T> = Result<T, LeadcalError>;
