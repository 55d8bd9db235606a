//! Anthropic Messages API backend.

use crate::backend::{ModelBackend, ModelRequest, ModelResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

/// Connection settings for the Anthropic API.
#[derive(Clone, Deserialize)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Max tokens used when a request does not set its own.
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

impl AnthropicConfig {
    /// Creates a configuration with default model and endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            default_max_tokens: default_max_tokens(),
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("default_max_tokens", &self.default_max_tokens)
            .finish()
    }
}

/// Model backend calling `POST /v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    /// Creates a backend with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "API key is empty".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, request: &ModelRequest) -> JsonValue {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens.unwrap_or(self.config.default_max_tokens),
            "messages": request.messages,
        });

        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

fn parse_response(body: &str) -> Result<ModelResponse, LlmError> {
    serde_json::from_str(body).map_err(|e| LlmError::ResponseParseFailed {
        reason: e.to_string(),
    })
}

fn classify_transport_error(error: &reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout
    } else if error.is_connect() {
        LlmError::ProviderUnavailable {
            provider: PROVIDER.to_string(),
            reason: error.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    #[instrument(skip(self, request), fields(model = %self.config.model, turns = request.messages.len()))]
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, LlmError> {
        let response = self
            .http
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Messages API request failed");
                classify_transport_error(&e)
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Messages API returned error");
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e))?;
        let parsed = parse_response(&body)?;

        debug!(
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("none"),
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Messages API response"
        );

        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
