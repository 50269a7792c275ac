//! # narrative-core
//!
//! Provider-agnostic contract for turning a rendered prompt into generated text.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────────────┐
//! │ PromptText   │───▶│   Messages   │───▶│   LlmProvider         │
//! │ (system+user)│    │ (role, text) │    │   (Strategy)          │
//! └──────────────┘    └──────────────┘    └───────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI-compatible
//! endpoints, a local Ollama daemon, or a scripted provider in tests.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{ProviderError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage};
