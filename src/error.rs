//! Error types for the verdict engine

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation exhausted after {attempts} attempt(s): {last_error}")]
    GenerationExhausted { attempts: u32, last_error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    /// Rate limits and deadline misses are the only failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::RateLimited(_) | EngineError::GenerationTimeout(_)
        )
    }
}

/// The only failures allowed to cross the orchestrator boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFacingError {
    NotFound,
    UpstreamUnavailable,
}

impl fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserFacingError::NotFound => {
                "Asset not found. Paste a valid contract address or a market URL."
            }
            UserFacingError::UpstreamUnavailable => {
                "Market data is unavailable right now. Try again shortly."
            }
        };
        write!(f, "{}", s)
    }
}

impl std::error::Error for UserFacingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classes() {
        assert!(EngineError::RateLimited("429".into()).is_retryable());
        assert!(EngineError::GenerationTimeout(Duration::from_secs(15)).is_retryable());
        assert!(!EngineError::Generation("bad request".into()).is_retryable());
        assert!(!EngineError::Upstream("503".into()).is_retryable());
        assert!(!EngineError::GenerationExhausted {
            attempts: 3,
            last_error: "rate limited".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_user_facing_messages() {
        assert!(UserFacingError::NotFound.to_string().contains("not found"));
        assert_eq!(
            serde_json::to_string(&UserFacingError::UpstreamUnavailable).unwrap(),
            "\"upstream_unavailable\""
        );
    }
}
