//! Model backends for the critic and the extractor.
//!
//! Both capabilities send the same shape of request: fixed instructions plus
//! one untrusted document. [`Prompt`] keeps the two apart so a provider can
//! never mix document text into the instruction slot, and only the
//! instructions are eligible for prompt caching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::prompts;

pub mod secrets;

#[cfg(feature = "anthropic")]
mod anthropic;

pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("credential rejected")]
    Unauthorized,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Model settings shared by every request of one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    /// 0.0 for deterministic sampling
    pub temperature: f32,
    /// HTTP timeout; the orchestrator applies its own capability timeout on top
    #[serde(with = "crate::config::duration")]
    pub timeout: Duration,
    /// Mark the instructions as cacheable
    pub cache_instructions: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout: Duration::from_secs(15),
            cache_instructions: true,
        }
    }
}

/// Trusted instructions plus one wrapped, untrusted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Always a compile-time constant
    pub instructions: &'static str,
    pub document: String,
}

impl Prompt {
    /// Wrap `text` in document tags behind `instructions`.
    pub fn new(instructions: &'static str, text: &str) -> Self {
        Self {
            instructions,
            document: prompts::wrap_document(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Model that served the request
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Input tokens served from the prompt cache
    pub cached_input_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A completion backend. The only place model calls are made.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<Completion, ProviderError>;
}
