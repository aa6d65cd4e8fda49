use std::time::Duration;

use crate::error::{GuideError, Result};
use crate::services::openai_client::DEFAULT_BASE_URL;

/// Models tried in order until one returns usable text
pub const FALLBACK_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];
pub const DEFAULT_MAX_TOKENS: u32 = 2500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings shared by the requester and the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct GuideConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl GuideConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read settings from the process environment.
    ///
    /// `OPENAI_API_KEY` is required. `OPENAI_BASE_URL`, `TRAVEL_GUIDE_MODELS`
    /// (comma separated) and `TRAVEL_GUIDE_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GuideError::Config(
                    "OPENAI_API_KEY environment variable must be set before generating a plan"
                        .to_string(),
                )
            })?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }

        if let Some(models) = lookup("TRAVEL_GUIDE_MODELS") {
            let models = parse_model_list(&models);
            if !models.is_empty() {
                config.models = models;
            }
        }

        if let Some(raw) = lookup("TRAVEL_GUIDE_TIMEOUT_SECS") {
            let seconds = raw.trim().parse::<u64>().map_err(|err| {
                GuideError::Config(format!("invalid TRAVEL_GUIDE_TIMEOUT_SECS '{}': {}", raw, err))
            })?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }
}

/// Split a comma-separated model list, dropping blanks
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}
