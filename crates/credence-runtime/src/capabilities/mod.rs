//! Async capabilities consulted between pipeline stages.
//!
//! The core's [`Critic`](credence_core::Critic) and
//! [`ExternalExtractor`](credence_core::ExternalExtractor) are synchronous
//! and pure. The agents here do the I/O; the orchestrator feeds their
//! results back to the core as a `StaticCritic` verdict or a
//! `PrecomputedExtraction`.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use credence_core::{CapabilityError, CriticVerdict, ExternalExtraction, LayeredText};

use crate::providers::ProviderError;

mod critic;
mod extractor;
mod validator;

pub use critic::LlmCritic;
pub use extractor::LlmExtractor;
pub use validator::{ExtractionValidationError, ExtractionValidator};

/// An external capability with its own timeout and circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Critic,
    Extractor,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Critic => "critic",
            Capability::Extractor => "extractor",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from capability agents.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("extraction not grounded in document: {0}")]
    Ungrounded(#[from] ExtractionValidationError),
}

impl From<AgentError> for CapabilityError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Provider(e) => CapabilityError::Unavailable(e.to_string()),
            e @ (AgentError::InvalidOutput(_) | AgentError::Ungrounded(_)) => {
                CapabilityError::InvalidOutput(e.to_string())
            }
        }
    }
}

/// A critic that reviews the document's layers.
#[async_trait]
pub trait CriticAgent: Send + Sync {
    fn name(&self) -> &str;

    /// Review the document. Errors fall back to an unavailable verdict.
    async fn review(&self, layers: &LayeredText) -> Result<CriticVerdict, AgentError>;
}

/// An extractor that turns screened text into structured claims.
#[async_trait]
pub trait ExtractionAgent: Send + Sync {
    fn name(&self) -> &str;

    /// Extract claims from text that passed the integrity gate.
    async fn extract(&self, text: &str) -> Result<ExternalExtraction, AgentError>;
}
