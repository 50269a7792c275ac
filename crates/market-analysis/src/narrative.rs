//! Narrative Generator
//!
//! Sends a rendered prompt to an [`LlmProvider`] and returns the commentary.
//! One attempt per run, bounded by a timeout. Failures are returned as typed
//! errors; nothing is ever substituted for a missing answer.

use std::sync::Arc;
use std::time::Duration;

use narrative_core::{GenerationOptions, LlmProvider};

use crate::error::{AnalysisError, Result};
use crate::prompt::PromptText;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct NarrativeGenerator {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    timeout: Duration,
}

impl NarrativeGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            options,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Log provider availability; never fails the run on its own
    async fn probe(&self) {
        match tokio::time::timeout(self.timeout, self.provider.health_check()).await {
            Ok(Ok(true)) => tracing::debug!(provider = self.provider.name(), "provider healthy"),
            Ok(Ok(false)) => {
                tracing::warn!(provider = self.provider.name(), "provider reports unhealthy");
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "provider health check failed");
            }
            Err(_) => tracing::warn!(provider = self.provider.name(), "provider health check timed out"),
        }
    }

    pub async fn generate(&self, prompt: &PromptText) -> Result<String> {
        self.probe().await;

        let messages = prompt.clone().into_messages();
        tracing::info!(
            provider = self.provider.name(),
            model = %self.options.model,
            "requesting commentary"
        );

        let completion = tokio::time::timeout(
            self.timeout,
            self.provider.complete(&messages, &self.options),
        )
        .await
        .map_err(|_| {
            AnalysisError::RemoteService(format!(
                "{} did not answer within {}s",
                self.provider.name(),
                self.timeout.as_secs()
            ))
        })??;

        if completion.content.trim().is_empty() {
            return Err(AnalysisError::RemoteService(format!(
                "{} returned an empty completion",
                self.provider.name()
            )));
        }
        if completion.truncated() {
            tracing::warn!(model = %completion.model, "commentary was cut off at the token limit");
        }
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        Ok(completion.content)
    }
}
