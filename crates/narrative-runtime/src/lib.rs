//! # narrative-runtime
//!
//! Concrete text-completion providers.
//!
//! ## Providers
//!
//! - **OpenAI** (default): any OpenAI-compatible `/chat/completions` endpoint
//! - **Ollama** (`ollama` feature): local inference via an Ollama daemon
//!
//! ## Usage
//!
//! ```rust,ignore
//! use narrative_runtime::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env()?;
//! let completion = provider.complete(&messages, &options).await?;
//! ```

pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use narrative_core::{
    Completion, GenerationOptions, LlmProvider, Message, ProviderError, Result, Role,
};
