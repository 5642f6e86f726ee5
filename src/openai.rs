//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint speaking the `/chat/completions` protocol
//! (Together, OpenAI, local inference servers). Every failure mode is
//! translated into [`SessionError::Completion`] at this boundary.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::{CompletionClient, CompletionOptions, Message, SessionError};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// Client configuration: credential + endpoint.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create config from environment variables.
    ///
    /// Resolution order for the credential: `TOGETHER_API_KEY`, then
    /// `OPENAI_API_KEY`. `OPENAI_BASE_URL` overrides the endpoint.
    pub fn from_env() -> Result<Self, SessionError> {
        let api_key = std::env::var("TOGETHER_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                SessionError::Completion(
                    "no API credential configured; set TOGETHER_API_KEY or OPENAI_API_KEY".into(),
                )
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// HTTP client for the chat-completions endpoint.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build the JSON request body for the chat-completions protocol.
    fn build_request_body(
        &self,
        messages: &[Message],
        opts: &CompletionOptions,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": opts.model,
            "messages": messages,
            "temperature": opts.temperature,
            "max_tokens": opts.max_tokens,
        })
    }

    /// Extract the reply text from a chat-completions response.
    fn parse_response(&self, json: serde_json::Value) -> Result<String, SessionError> {
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                SessionError::Completion("malformed response: no message content in choices".into())
            })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        opts: &CompletionOptions,
    ) -> Result<String, SessionError> {
        let body = self.build_request_body(messages, opts);

        debug!(model = %opts.model, messages = messages.len(), "chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(SessionError::Completion(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SessionError::Completion(e.to_string()))?;

        self.parse_response(json)
    }
}
