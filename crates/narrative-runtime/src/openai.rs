//! OpenAI-compatible Provider
//!
//! Implementation of `LlmProvider` over the `/chat/completions` HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use narrative_core::{
    error::{ProviderError, Result},
    message::Message,
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API root, without trailing slash
    pub base_url: String,

    /// Bearer token
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::with_env_key(api_key))
    }

    /// `OPENAI_BASE_URL` and `OPENAI_TIMEOUT_SECS` from the environment with
    /// a key supplied by the caller
    pub fn with_env_key(api_key: impl Into<String>) -> Self {
        Self::from_parts(
            api_key,
            std::env::var("OPENAI_BASE_URL").ok(),
            std::env::var("OPENAI_TIMEOUT_SECS").ok(),
        )
    }

    /// Unset or unparsable values fall back to the defaults
    pub fn from_parts(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            base_url: base_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.base_url),
            api_key: api_key.into(),
            timeout_secs: timeout_secs
                .and_then(|t| t.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI-compatible LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: String,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("API key is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage<'_>> {
        messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role.to_string(),
                content: &m.content,
            })
            .collect()
    }

    fn convert_completion(response: ChatResponse, requested_model: &str) -> Result<Completion> {
        let model = response.model.unwrap_or_else(|| requested_model.to_string());
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyCompletion(model.clone()))?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion(model));
        }

        Ok(Completion {
            content,
            model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
        })
    }

    /// Map a non-success HTTP status to a typed error, keeping the provider's detail
    fn status_error(status: StatusCode, body: &str) -> ProviderError {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map_or_else(|_| body.trim().to_string(), |e| e.error.message);
        let detail = format!("{status}: {detail}");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
            s if s.is_client_error() => ProviderError::InvalidRequest(detail),
            _ => ProviderError::Provider(detail),
        }
    }

    fn transport_error(err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() || err.is_connect() {
            ProviderError::ProviderUnavailable(err.to_string())
        } else {
            ProviderError::Provider(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
        };

        tracing::debug!(model = %options.model, messages = messages.len(), "requesting completion");

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        Self::convert_completion(parsed, &options.model)
    }
}
