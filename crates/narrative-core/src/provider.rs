//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for text-completion backends (OpenAI-compatible
//! APIs, Ollama, ...) so the commentary step works with any of them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use narrative_core::{GenerationOptions, LlmProvider, Message};
//!
//! let provider = OpenAiProvider::from_env()?;
//! let messages = [Message::system("..."), Message::user("...")];
//! let completion = provider.complete(&messages, &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

const fn default_temperature() -> f32 { 0.7 }
const fn default_max_tokens() -> u32 { 512 }
const fn default_top_p() -> f32 { 1.0 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl GenerationOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Whether generation stopped because it ran out of tokens
    pub fn truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

impl FinishReason {
    /// Map a provider's free-form finish reason
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" | "end_turn" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => Self::Error,
        }
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// A single call is made per run; implementations must not retry.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    struct Scripted(Option<&'static str>);

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let text = self.0.ok_or_else(|| ProviderError::Provider("boom".into()))?;
            Ok(Completion {
                content: format!("{text} ({} messages)", messages.len()),
                model: options.model.clone(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }
    }

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.model, "gpt-4");
        assert_eq!(opts.max_tokens, 512);
        assert_eq!(GenerationOptions::default().with_model("llama3.2").model, "llama3.2");
    }

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(FinishReason::parse("weird"), FinishReason::Error);
    }

    #[tokio::test]
    async fn test_provider_through_trait_object() {
        let provider: Box<dyn LlmProvider> = Box::new(Scripted(Some("hello")));
        let messages = [Message::system("s"), Message::user("u")];
        let completion = provider
            .complete(&messages, &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.content, "hello (2 messages)");
        assert!(!completion.truncated());

        let failing: Box<dyn LlmProvider> = Box::new(Scripted(None));
        let err = failing
            .complete(&messages, &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
