//! External reasoning provider adapter.
//!
//! Provides the `ReasoningBackend` trait and one implementation per provider
//! wire shape. The adapter only sends a prompt and extracts the raw text
//! completion; parsing that text into domain shapes belongs to the callers.
//!
//! When no provider is configured the adapter simply does not exist
//! (`ReasoningAdapter::from_config` returns `None`), and every runtime
//! failure — network, HTTP status, malformed body — is swallowed into a
//! logged `None` so the deterministic path can run instead.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Errors from reasoning provider calls.
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Completion contained no text")]
    EmptyCompletion,
}

/// Which provider to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Reasoning assistance disabled
    #[default]
    None,
    OpenAi,
    Anthropic,
    Gemini,
}

impl From<&str> for Provider {
    /// Unrecognized names map to `None`, which disables the adapter — an
    /// explicit choice so a typo in configuration degrades to the
    /// deterministic path instead of erroring.
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "gemini" => Self::Gemini,
            _ => Self::None,
        }
    }
}

/// Reasoning provider configuration, passed in explicitly by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    pub provider: Provider,

    #[serde(default)]
    pub api_key: String,

    /// Provider model name; each backend has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: Provider::None,
            api_key: String::new(),
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ReasoningConfig {
    /// A config is usable only with a real provider and a non-empty key.
    pub fn is_configured(&self) -> bool {
        self.provider != Provider::None && !self.api_key.trim().is_empty()
    }
}

/// Trait for reasoning backends (OpenAI, Anthropic, Gemini).
///
/// Each backend owns its request/response shape; the caller sees only
/// prompt-in, text-out.
pub trait ReasoningBackend {
    /// Send the prompt and return the raw text completion.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ReasoningError>> + Send;

    /// Get the backend name for logging.
    fn name(&self) -> &'static str;
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

async fn read_success_body(
    response: reqwest::Response,
) -> Result<serde_json::Value, ReasoningError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ReasoningError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ReasoningError::Parse(e.to_string()))
}

/// OpenAI chat-completions backend.
pub struct OpenAiBackend {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: Option<String>, timeout_secs: u64) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            client: http_client(timeout_secs),
        }
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
        })
    }

    fn extract_text(response: &serde_json::Value) -> Result<String, ReasoningError> {
        response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .ok_or(ReasoningError::EmptyCompletion)
    }
}

impl ReasoningBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&self.build_body(prompt))
            .send()
            .await
            .map_err(|e| ReasoningError::Connection(e.to_string()))?;

        let json = read_success_body(response).await?;
        Self::extract_text(&json)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Anthropic messages backend.
pub struct AnthropicBackend {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: String, model: Option<String>, timeout_secs: u64) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| "claude-3-5-haiku-20241022".to_string()),
            client: http_client(timeout_secs),
        }
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": prompt}],
        })
    }

    fn extract_text(response: &serde_json::Value) -> Result<String, ReasoningError> {
        response
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|b| b.get("text"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .ok_or(ReasoningError::EmptyCompletion)
    }
}

impl ReasoningBackend for AnthropicBackend {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&self.build_body(prompt))
            .send()
            .await
            .map_err(|e| ReasoningError::Connection(e.to_string()))?;

        let json = read_success_body(response).await?;
        Self::extract_text(&json)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Google Gemini generateContent backend.
pub struct GeminiBackend {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: Option<String>, timeout_secs: u64) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            client: http_client(timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
        })
    }

    fn extract_text(response: &serde_json::Value) -> Result<String, ReasoningError> {
        response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .ok_or(ReasoningError::EmptyCompletion)
    }
}

impl ReasoningBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_body(prompt))
            .send()
            .await
            .map_err(|e| ReasoningError::Connection(e.to_string()))?;

        let json = read_success_body(response).await?;
        Self::extract_text(&json)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// The configured reasoning adapter — a closed set of provider strategies.
pub enum ReasoningAdapter {
    OpenAi(OpenAiBackend),
    Anthropic(AnthropicBackend),
    Gemini(GeminiBackend),
}

impl ReasoningAdapter {
    /// Build an adapter from configuration.
    ///
    /// Returns `None` when the config is unconfigured (`Provider::None` or
    /// an empty key); callers skip the reasoning path entirely in that case.
    pub fn from_config(config: &ReasoningConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let key = config.api_key.clone();
        let model = config.model.clone();
        match config.provider {
            Provider::None => None,
            Provider::OpenAi => Some(Self::OpenAi(OpenAiBackend::new(
                key,
                model,
                config.timeout_secs,
            ))),
            Provider::Anthropic => Some(Self::Anthropic(AnthropicBackend::new(
                key,
                model,
                config.timeout_secs,
            ))),
            Provider::Gemini => Some(Self::Gemini(GeminiBackend::new(
                key,
                model,
                config.timeout_secs,
            ))),
        }
    }

    /// Name of the active provider, for logging.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::OpenAi(b) => b.name(),
            Self::Anthropic(b) => b.name(),
            Self::Gemini(b) => b.name(),
        }
    }

    /// Send a prompt; `None` on any failure.
    ///
    /// Single attempt, no retry. Failures are logged at warn level and
    /// otherwise invisible to the caller — this method never errors.
    pub async fn query(&self, prompt: &str) -> Option<String> {
        tracing::debug!(provider = self.provider_name(), "Querying reasoning provider");

        let result = match self {
            Self::OpenAi(b) => b.complete(prompt).await,
            Self::Anthropic(b) => b.complete(prompt).await,
            Self::Gemini(b) => b.complete(prompt).await,
        };

        match result {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    provider = self.provider_name(),
                    error = %e,
                    "Reasoning provider failed, falling back to deterministic analysis"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from("openai"), Provider::OpenAi);
        assert_eq!(Provider::from("Anthropic"), Provider::Anthropic);
        assert_eq!(Provider::from("GEMINI"), Provider::Gemini);
        assert_eq!(Provider::from("none"), Provider::None);
        assert_eq!(Provider::from("mystery"), Provider::None);
    }

    #[test]
    fn test_unconfigured_yields_no_adapter() {
        assert!(ReasoningAdapter::from_config(&ReasoningConfig::default()).is_none());

        let no_key = ReasoningConfig {
            provider: Provider::OpenAi,
            api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(ReasoningAdapter::from_config(&no_key).is_none());
    }

    #[test]
    fn test_configured_adapter_built() {
        let config = ReasoningConfig {
            provider: Provider::Anthropic,
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        let adapter = ReasoningAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.provider_name(), "anthropic");
    }

    #[test]
    fn test_openai_body_shape() {
        let backend = OpenAiBackend::new("k".into(), None, 10);
        let body = backend.build_body("assess this vehicle");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "assess this vehicle");
    }

    #[test]
    fn test_openai_extract() {
        let response = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"score\": 70}"}}]
        });
        assert_eq!(
            OpenAiBackend::extract_text(&response).unwrap(),
            "{\"score\": 70}"
        );

        let empty = serde_json::json!({"choices": []});
        assert!(matches!(
            OpenAiBackend::extract_text(&empty),
            Err(ReasoningError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_anthropic_extract() {
        let response = serde_json::json!({
            "content": [{"type": "text", "text": "hello"}],
            "stop_reason": "end_turn"
        });
        assert_eq!(AnthropicBackend::extract_text(&response).unwrap(), "hello");
    }

    #[test]
    fn test_gemini_extract_and_endpoint() {
        let backend = GeminiBackend::new("k".into(), Some("gemini-1.5-pro".into()), 10);
        assert!(backend.endpoint().ends_with("gemini-1.5-pro:generateContent"));

        let response = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        });
        assert_eq!(GeminiBackend::extract_text(&response).unwrap(), "ok");
    }
}
