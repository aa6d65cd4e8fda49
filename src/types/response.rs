//! Decoding of chat-completion payloads into plain text.
//!
//! Providers disagree on the shape of `message.content`: most return a string,
//! some return an array of fragments that mix bare strings with objects carrying
//! a `text` field. Everything is folded into [`NormalizedCompletion`] here so the
//! fallback loop only ever sees text or an error.

use serde::Deserialize;
use serde_json::Value;

use super::result::TokenUsage;
use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<UsagePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// `message.content` as sent by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Fragment {
        #[serde(default)]
        text: Option<String>,
    },
    Other(Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsagePayload {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Provider response reduced to what the requester needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedCompletion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl MessageContent {
    /// Joined, trimmed text of every extractable fragment
    pub fn extract_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.trim().to_string(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(ContentPart::text)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
            MessageContent::Other(_) => String::new(),
        }
    }
}

impl ContentPart {
    fn text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::Fragment { text } => text.as_deref(),
            ContentPart::Other(_) => None,
        }
    }
}

impl UsagePayload {
    fn into_usage(self) -> Option<TokenUsage> {
        Some(TokenUsage {
            prompt_tokens: self.prompt_tokens?,
            completion_tokens: self.completion_tokens?,
            total_tokens: self.total_tokens?,
        })
    }
}

impl ChatCompletionResponse {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Text of the first choice; empty when nothing usable was returned
    pub fn first_text(&self) -> String {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_ref())
            .map(MessageContent::extract_text)
            .unwrap_or_default()
    }

    pub fn normalize(self) -> NormalizedCompletion {
        let text = self.first_text();
        NormalizedCompletion {
            text,
            usage: self.usage.and_then(UsagePayload::into_usage),
        }
    }
}

/// Decode a raw provider payload in one step
pub fn normalize_completion(value: Value) -> Result<NormalizedCompletion> {
    Ok(ChatCompletionResponse::from_value(value)?.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_content() {
        let completion = normalize_completion(json!({
            "choices": [{"message": {"role": "assistant", "content": "  ## Trip Overview\n"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 900, "total_tokens": 1020}
        }))
        .unwrap();

        assert_eq!(completion.text, "## Trip Overview");
        assert_eq!(completion.usage.unwrap().total_tokens, 1020);
    }

    #[test]
    fn test_mixed_fragment_content() {
        let completion = normalize_completion(json!({
            "choices": [{"message": {"content": [
                "## Trip Overview",
                {"type": "text", "text": "A great trip."},
                {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}},
                {"type": "text", "text": 42}
            ]}}]
        }))
        .unwrap();

        assert_eq!(completion.text, "## Trip Overview\nA great trip.");
        assert!(completion.usage.is_none());
    }

    #[test]
    fn test_null_and_missing_content_is_empty() {
        let null_content = normalize_completion(json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert!(null_content.text.is_empty());

        let no_choices = normalize_completion(json!({"choices": []})).unwrap();
        assert!(no_choices.text.is_empty());

        let odd_shape = normalize_completion(json!({
            "choices": [{"message": {"content": {"unexpected": true}}}]
        }))
        .unwrap();
        assert!(odd_shape.text.is_empty());
    }

    #[test]
    fn test_partial_usage_is_dropped() {
        let completion = normalize_completion(json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"prompt_tokens": 3}
        }))
        .unwrap();
        assert!(completion.usage.is_none());
    }
}
