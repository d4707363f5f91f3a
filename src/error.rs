//! Petmatch error types

use std::time::Duration;

/// Petmatch error types
#[derive(Debug, thiserror::Error)]
pub enum PetMatchError {
    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("pet not found: {0}")]
    PetNotFound(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response from completion service")]
    EmptyResponse,

    // Validation errors
    #[error("invalid postal code: {0:?}")]
    InvalidPostalCode(String),

    #[error("no candidate pets to recommend from")]
    NoCandidates,

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PetMatchError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limits, transport failures, and 5xx responses are transient;
    /// everything else (auth, validation, missing entities) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            PetMatchError::Http(_) | PetMatchError::RateLimited { .. } => true,
            PetMatchError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-supplied retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PetMatchError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for petmatch operations
pub type Result<T> = std::result::Result<T, PetMatchError>;
