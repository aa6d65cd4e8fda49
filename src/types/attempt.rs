use serde::{Deserialize, Serialize};

/// Outcome of a single model call inside the fallback loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAttempt {
    pub model_id: String,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ModelAttempt {
    pub fn succeeded(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failed(model_id: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            succeeded: false,
            error_detail: Some(error_detail.into()),
        }
    }

    /// One-line summary used in traces and diagnostics
    pub fn describe(&self) -> String {
        match (&self.succeeded, &self.error_detail) {
            (true, _) => format!("{}: ok", self.model_id),
            (false, Some(detail)) => format!("{}: failed ({})", self.model_id, detail),
            (false, None) => format!("{}: failed", self.model_id),
        }
    }
}
