//! Error Types

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors raised while talking to a text-generation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The service answered with an error payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unreachable, timed out, or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The request itself was rejected (unknown model, bad payload)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered but produced no usable text
    #[error("Empty completion from {0}")]
    EmptyCompletion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Check if error is transient; callers own the retry policy
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::ProviderUnavailable(_)
                | Self::RateLimited(_)
                | Self::EmptyCompletion(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::InvalidRequest(msg) => format!("The AI service rejected the request: {msg}"),
            Self::EmptyCompletion(_) => "The AI service returned an empty answer.".into(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication failed. Please check your API key.".into(),
            Self::Config(msg) => format!("Provider is misconfigured: {msg}"),
            Self::Json(_) => "The AI service sent a response that could not be read.".into(),
        }
    }
}
