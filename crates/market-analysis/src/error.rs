//! Error Types for the Market Analysis pipeline

use narrative_core::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Malformed response from {source_name}: {detail}")]
    MalformedResponse {
        source_name: &'static str,
        detail: String,
    },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Division by zero: {0} baseline is zero")]
    DivisionByZero(&'static str),

    #[error("Narrative service error: {0}")]
    RemoteService(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Transient failures a caller may choose to retry; everything else is permanent
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteFetch(_) | Self::RemoteService(_))
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::RemoteFetch(_) => {
                "Market data is temporarily unavailable. Please try again later.".into()
            }
            Self::MalformedResponse { source_name, .. } => {
                format!("{source_name} returned data that could not be used.")
            }
            Self::EmptyInput(what) => format!("Not enough market data: {what} is empty."),
            Self::DivisionByZero(what) => {
                format!("Cannot compare against a zero {what}; the data looks incomplete.")
            }
            Self::RemoteService(_) => {
                "The commentary service is currently unavailable. Please try again.".into()
            }
            Self::InvalidInput(msg) => format!("Invalid request: {msg}"),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
        }
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidRequest(msg) => Self::InvalidInput(msg),
            ProviderError::Config(msg) | ProviderError::Auth(msg) => Self::Config(msg),
            ProviderError::Json(e) => Self::MalformedResponse {
                source_name: "narrative service",
                detail: e.to_string(),
            },
            err @ (ProviderError::Provider(_)
            | ProviderError::ProviderUnavailable(_)
            | ProviderError::RateLimited(_)
            | ProviderError::EmptyCompletion(_)) => Self::RemoteService(err.to_string()),
        }
    }
}
