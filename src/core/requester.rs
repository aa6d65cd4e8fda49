use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::prompts::{build_user_prompt, SELF_TEST_PROMPT, SYSTEM_PROMPT};
use super::provider::{CompletionProvider, OpenAIProvider};
use crate::{
    config::{
        GuideConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
        FALLBACK_MODELS,
    },
    error::{GuideError, Result},
    services::openai_client::ChatCompletionRequest,
    types::{
        attempt::ModelAttempt, response::NormalizedCompletion, result::Itinerary,
        trip::TripRequest,
    },
};

const SELF_TEST_MAX_TOKENS: u32 = 10;

/// Produces itinerary text by walking a prioritized model list.
///
/// Candidates are tried strictly in order, one call each. The first one that
/// yields non-blank text wins. Failures for which
/// [`GuideError::is_attempt_failure`] holds move the loop on to the next model;
/// any other error from the provider ends the loop and is returned as is.
///
/// The requester's timeout is the only bound on a call: it wraps whatever the
/// provider does.
#[derive(Debug, Clone)]
pub struct CompletionRequester {
    provider: Arc<dyn CompletionProvider>,
    models: Vec<String>,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
}

impl CompletionRequester {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &GuideConfig) -> Self {
        let provider =
            OpenAIProvider::new(config.api_key.clone()).with_base_url(config.base_url.clone());

        Self::new(Arc::new(provider))
            .with_models(config.models.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
            .with_timeout(config.timeout)
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Validate the trip, build the prompts and run the fallback loop over the
    /// configured model list.
    pub async fn generate(&self, trip: &TripRequest) -> Result<Itinerary> {
        trip.validate()?;
        let user_prompt = build_user_prompt(trip);
        self.request_itinerary(SYSTEM_PROMPT, &user_prompt, &self.models)
            .await
    }

    pub async fn request_itinerary(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model_priority: &[String],
    ) -> Result<Itinerary> {
        let start = Instant::now();
        let mut attempts = Vec::with_capacity(model_priority.len());
        let mut last_error: Option<GuideError> = None;

        for model in model_priority {
            match self.attempt(model, system_prompt, user_prompt).await {
                Ok(completion) => {
                    attempts.push(ModelAttempt::succeeded(model.as_str()));
                    info!(
                        target: "travel_guide::requester",
                        model = %model,
                        attempts = attempts.len(),
                        chars = completion.text.len(),
                        "itinerary generated"
                    );
                    return Ok(Itinerary::new(
                        completion.text,
                        model.clone(),
                        completion.usage,
                        attempts,
                        start.elapsed(),
                    ));
                }
                Err(err) if !err.is_attempt_failure() => return Err(err),
                Err(err) => {
                    warn!(
                        target: "travel_guide::requester",
                        model = %model,
                        code = err.error_code(),
                        error = %err,
                        "model attempt failed, trying next candidate"
                    );
                    attempts.push(ModelAttempt::failed(model.as_str(), err.to_string()));
                    last_error = Some(err);
                }
            }
        }

        let last_error = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no models configured".to_string());

        Err(GuideError::AllModelsExhausted {
            attempts,
            last_error,
        })
    }

    async fn attempt(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<NormalizedCompletion> {
        debug!(target: "travel_guide::requester", %model, "requesting completion");

        let request = ChatCompletionRequest::system_and_user(model, system_prompt, user_prompt)
            .with_max_tokens(Some(self.max_tokens))
            .with_temperature(Some(self.temperature));

        let completion = self.call(request).await?;

        if completion.text.trim().is_empty() {
            return Err(GuideError::EmptyContent {
                model: model.to_string(),
            });
        }

        Ok(completion)
    }

    async fn call(&self, request: ChatCompletionRequest) -> Result<NormalizedCompletion> {
        timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                GuideError::Timeout(format!("model call timed out after {:?}", self.timeout))
            })?
    }

    /// Ask the first model for a one-word reply and return whatever came back.
    ///
    /// No fallback is performed; this only reports whether the key and the
    /// first model are usable.
    pub async fn self_test(&self) -> Result<String> {
        let model = self.models.first().ok_or_else(|| {
            GuideError::Config("no models configured for the self-test".to_string())
        })?;

        let request = ChatCompletionRequest::new(
            model.as_str(),
            vec![serde_json::json!({ "role": "user", "content": SELF_TEST_PROMPT })],
        )
        .with_max_tokens(Some(SELF_TEST_MAX_TOKENS));

        let completion = self.call(request).await?;
        info!(
            target: "travel_guide::requester",
            %model,
            reply = %completion.text,
            "self-test finished"
        );
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    enum Reply {
        Text(&'static str),
        Fail(&'static str),
        Misconfigured(&'static str),
        Hang,
    }

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        replies: HashMap<String, Reply>,
        calls: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[(&str, Reply)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(model, reply)| (model.to_string(), reply.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn called_models(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|request| request.model().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: ChatCompletionRequest) -> Result<NormalizedCompletion> {
            let model = request.model().to_string();
            self.calls.lock().unwrap().push(request);

            match self.replies.get(&model).cloned() {
                Some(Reply::Text(text)) => Ok(NormalizedCompletion {
                    text: text.to_string(),
                    usage: None,
                }),
                Some(Reply::Fail(message)) => Err(GuideError::ModelCall {
                    model,
                    message: message.to_string(),
                }),
                Some(Reply::Misconfigured(message)) => {
                    Err(GuideError::Config(message.to_string()))
                }
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("timeout should fire first")
                }
                None => Err(GuideError::ModelCall {
                    model,
                    message: "model not found".to_string(),
                }),
            }
        }
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("a", Reply::Text("## Plan A")),
            ("b", Reply::Text("## Plan B")),
        ]));
        let requester = CompletionRequester::new(provider.clone());

        let itinerary = requester
            .request_itinerary("sys", "user", &models(&["a", "b"]))
            .await
            .unwrap();

        assert_eq!(itinerary.text, "## Plan A");
        assert_eq!(itinerary.model_used, "a");
        assert_eq!(provider.called_models(), vec!["a"]);
        assert!(!itinerary.used_fallback());
    }

    #[tokio::test]
    async fn test_failures_and_empty_content_fall_through() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("a", Reply::Fail("HTTP 503 error: overloaded")),
            ("b", Reply::Text("   \n  ")),
            ("c", Reply::Text("## Trip Overview")),
            ("d", Reply::Text("never asked")),
        ]));
        let requester = CompletionRequester::new(provider.clone());

        let itinerary = requester
            .request_itinerary("sys", "user", &models(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(itinerary.model_used, "c");
        assert_eq!(provider.called_models(), vec!["a", "b", "c"]);
        assert_eq!(itinerary.fallback_count(), 2);
        assert_eq!(
            itinerary.attempts[1].error_detail.as_deref(),
            Some("Model 'b' returned empty content.")
        );
    }

    #[tokio::test]
    async fn test_all_models_exhausted_keeps_every_attempt() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("a", Reply::Fail("HTTP 500 error: boom")),
            ("b", Reply::Text("")),
        ]));
        let requester = CompletionRequester::new(provider);

        let err = requester
            .request_itinerary("sys", "user", &models(&["a", "b"]))
            .await
            .unwrap_err();

        match &err {
            GuideError::AllModelsExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts.iter().all(|a| !a.succeeded));
                assert_eq!(last_error, "Model 'b' returned empty content.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_attempt_error_stops_the_loop() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("a", Reply::Fail("HTTP 500 error: boom")),
            ("b", Reply::Misconfigured("no credentials for this backend")),
            ("c", Reply::Text("## Trip Overview")),
        ]));
        let requester = CompletionRequester::new(provider.clone());

        let err = requester
            .request_itinerary("sys", "user", &models(&["a", "b", "c"]))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(provider.called_models(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_priority_list() {
        let requester = CompletionRequester::new(Arc::new(ScriptedProvider::default()));

        let err = requester
            .request_itinerary("sys", "user", &[])
            .await
            .unwrap_err();

        assert!(err.attempts().is_empty());
        assert!(err.to_string().contains("no models configured"));
    }

    #[tokio::test]
    async fn test_timeout_moves_to_next_model() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("slow", Reply::Hang),
            ("fast", Reply::Text("## Trip Overview")),
        ]));
        let requester =
            CompletionRequester::new(provider).with_timeout(Duration::from_millis(20));

        let itinerary = requester
            .request_itinerary("sys", "user", &models(&["slow", "fast"]))
            .await
            .unwrap();

        assert_eq!(itinerary.model_used, "fast");
        assert!(itinerary.attempts[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let provider = Arc::new(ScriptedProvider::new(&[("gpt-4o", Reply::Text("ok"))]));
        let requester = CompletionRequester::new(provider.clone());

        requester
            .generate(&TripRequest::new("Paris", "2"))
            .await
            .unwrap();

        let calls = provider.calls.lock().unwrap();
        let body = calls[0].clone().into_value();
        assert_eq!(body["max_tokens"], 2500);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("- Destination: Paris"));
    }

    #[tokio::test]
    async fn test_generate_rejects_incomplete_trip() {
        let provider = Arc::new(ScriptedProvider::default());
        let requester = CompletionRequester::new(provider.clone());

        let err = requester
            .generate(&TripRequest::new("Paris", ""))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_REQUEST");
        assert!(provider.called_models().is_empty());
    }

    #[tokio::test]
    async fn test_self_test_uses_first_model_only() {
        let provider = Arc::new(ScriptedProvider::new(&[
            ("a", Reply::Fail("invalid api key")),
            ("b", Reply::Text("READY")),
        ]));
        let requester = CompletionRequester::new(provider.clone()).with_models(["a", "b"]);

        let err = requester.self_test().await.unwrap_err();
        assert!(err.to_string().contains("invalid api key"));
        assert_eq!(provider.called_models(), vec!["a"]);

        let calls = provider.calls.lock().unwrap();
        let body = calls[0].clone().into_value();
        assert_eq!(body["max_tokens"], 10);
        assert_eq!(body["messages"][0]["content"], SELF_TEST_PROMPT);
    }
}
