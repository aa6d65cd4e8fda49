use thiserror::Error;

use crate::types::attempt::ModelAttempt;

/// Main error type for the travel guide generator
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model '{model}' call failed: {message}")]
    ModelCall { model: String, message: String },

    #[error("Model '{model}' returned empty content.")]
    EmptyContent { model: String },

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("All model attempts failed. Last error: {last_error}")]
    AllModelsExhausted {
        attempts: Vec<ModelAttempt>,
        last_error: String,
    },

    #[error("Document build failed: {0}")]
    DocumentBuildFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GuideError>;

impl GuideError {
    /// Check if retrying the whole generation cycle could help
    pub fn is_retryable(&self) -> bool {
        match self {
            GuideError::Http(_) => true,
            GuideError::ModelCall { .. } => true,
            GuideError::EmptyContent { .. } => true,
            GuideError::RateLimit { .. } => true,
            GuideError::Timeout(_) => true,
            GuideError::AllModelsExhausted { .. } => true,
            _ => false,
        }
    }

    /// Errors the fallback loop absorbs by moving on to the next model
    pub fn is_attempt_failure(&self) -> bool {
        matches!(
            self,
            GuideError::Http(_)
                | GuideError::ModelCall { .. }
                | GuideError::EmptyContent { .. }
                | GuideError::RateLimit { .. }
                | GuideError::Timeout(_)
                | GuideError::Serialization(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            GuideError::Config(_) => "CONFIG_ERROR",
            GuideError::InvalidRequest(_) => "INVALID_REQUEST",
            GuideError::Http(_) => "HTTP_ERROR",
            GuideError::ModelCall { .. } => "MODEL_CALL_FAILED",
            GuideError::EmptyContent { .. } => "EMPTY_CONTENT",
            GuideError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            GuideError::Timeout(_) => "TIMEOUT_ERROR",
            GuideError::AllModelsExhausted { .. } => "ALL_MODELS_EXHAUSTED",
            GuideError::DocumentBuildFailed(_) => "DOCUMENT_BUILD_FAILED",
            GuideError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        });

        if let GuideError::AllModelsExhausted { attempts, .. } = self {
            payload["error"]["attempts"] = serde_json::to_value(attempts).unwrap_or_default();
        }

        payload
    }

    /// Attempts recorded before the fallback list ran out, if any
    pub fn attempts(&self) -> &[ModelAttempt] {
        match self {
            GuideError::AllModelsExhausted { attempts, .. } => attempts,
            _ => &[],
        }
    }
}
