//! Error types for the larder library.

use thiserror::Error;

/// Main error type for larder operations.
#[derive(Debug, Error)]
pub enum LarderError {
    /// The backing store is unreachable or rejected an operation.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Network or transport failure reaching the model service.
    #[error("model service unreachable: {0}")]
    Unreachable(String),

    /// The model service rate-limited the request.
    #[error("model service rate limited: {0}")]
    RateLimited(String),

    /// The model call exceeded the configured timeout.
    #[error("model call timed out after {0}s")]
    Timeout(u64),

    /// The model declined the request or returned an empty completion.
    #[error("model refused: {0}")]
    ModelRefused(String),

    /// The model completion was not valid JSON.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// JSON was valid but a required field is missing or mistyped.
    #[error("schema violation in field '{field}': {message}")]
    SchemaViolation { field: String, message: String },

    /// The pantry has no ingredients to cook from.
    #[error("no ingredients found in the pantry")]
    EmptyPantry,

    /// Refinement was requested without any preferences.
    #[error("no preferences supplied for refinement")]
    MissingPreferences,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LarderError {
    /// Whether the caller-level policy may retry this failure once.
    ///
    /// Only transport-level failures qualify; refusals and rate limits
    /// must never be retried without backoff.
    pub fn retryable(&self) -> bool {
        matches!(self, LarderError::Unreachable(_) | LarderError::Timeout(_))
    }

    /// Build a schema violation for a named field.
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        LarderError::SchemaViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for larder operations.
pub type Result<T> = std::result::Result<T, LarderError>;
