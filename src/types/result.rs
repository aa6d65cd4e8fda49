use super::attempt::ModelAttempt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Itinerary produced by one generation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Markdown returned by the model, trimmed
    pub text: String,
    /// Model that produced the text
    pub model_used: String,
    /// Token accounting for the successful call (if reported by the API)
    pub usage: Option<TokenUsage>,
    /// Every attempt made, in priority order, ending with the successful one
    pub attempts: Vec<ModelAttempt>,
    /// Wall time spent across all attempts
    pub duration: Duration,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prompt + {} completion = {} total",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

impl Itinerary {
    pub fn new(
        text: String,
        model_used: String,
        usage: Option<TokenUsage>,
        attempts: Vec<ModelAttempt>,
        duration: Duration,
    ) -> Self {
        Self {
            text,
            model_used,
            usage,
            attempts,
            duration,
        }
    }

    /// Number of models that failed before one succeeded
    pub fn fallback_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.succeeded).count()
    }

    /// True when a model other than the first candidate produced the text
    pub fn used_fallback(&self) -> bool {
        self.fallback_count() > 0
    }

    /// Human-readable trace of the generation cycle
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Itinerary Generation Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Model: {}", self.model_used));

        if let Some(usage) = &self.usage {
            lines.push(format!("Tokens: {}", usage));
        }

        lines.push(String::new());
        lines.push("--- Attempts ---".to_string());

        for (idx, attempt) in self.attempts.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, attempt.describe()));
        }

        lines.join("\n")
    }
}
