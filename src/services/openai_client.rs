use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{GuideError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Seconds reported for a 429 that carries no usable `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Issue a single chat-completion request. There is no retry here: a failed
    /// call is reported to the caller, which decides whether to move on. The
    /// request is not bounded in time; callers wrap it in their own timeout.
    pub async fn chat_completion(&self, body: &Value) -> Result<Value> {
        let model = body
            .get("model")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown")
            .to_string();
        let request_url = build_chat_url(&self.base_url);

        debug!(target: "travel_guide::http", %model, url = %request_url, "sending chat completion");

        let response = self
            .http
            .post(&request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            return Err(GuideError::RateLimit {
                retry_after: retry_after.max(1),
            });
        }

        let response_json: Value = match serde_json::from_str(&response_text) {
            Ok(value) => value,
            Err(err) if status.is_success() => {
                return Err(GuideError::ModelCall {
                    model,
                    message: format!("Failed to parse JSON: {err}"),
                });
            }
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            let api_message = api_error_message(&response_json).unwrap_or(response_text);

            return Err(GuideError::ModelCall {
                model,
                message: format!("HTTP {} error: {}", status, api_message),
            });
        }

        if let Some(error) = response_json.get("error").filter(|error| !error.is_null()) {
            let error_message =
                api_error_message(&response_json).unwrap_or_else(|| error.to_string());
            return Err(GuideError::ModelCall {
                model,
                message: format!("API error: {}", error_message),
            });
        }

        Ok(response_json)
    }
}

fn api_error_message(response_json: &Value) -> Option<String> {
    response_json
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|value| value.as_str())
        .map(|s| s.to_string())
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Body of a chat-completion call
#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    /// `[system, user]` conversation used by every itinerary request
    pub fn system_and_user(
        model: impl Into<String>,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Self {
        Self::new(
            model,
            vec![
                json!({ "role": "system", "content": system_prompt }),
                json!({ "role": "user", "content": user_prompt }),
            ],
        )
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}
