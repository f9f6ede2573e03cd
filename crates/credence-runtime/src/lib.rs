//! # credence-runtime
//!
//! Optional async runtime for Credence.
//!
//! `credence-core` is fully deterministic and never performs I/O. This crate
//! drives the core's staged pipeline and supplies the external collaborators
//! the core only knows as traits:
//!
//! - an LLM-backed adversarial critic and claim extractor
//! - concurrent evidence-source fetching with per-fetch timeout and retry
//! - sinks that receive emitted review requests
//!
//! ## Important
//!
//! Every external call is bounded by a timeout and guarded by a circuit
//! breaker. A failed capability falls back to the core's deterministic
//! behavior (safe verdict, pattern extraction, absent source) and is
//! recorded as a degradation on the outcome.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credence_runtime::{AnthropicProvider, RuntimeOrchestratorBuilder, InMemoryReviewQueue};
//! use credence_core::EvaluationRequest;
//!
//! let queue = Arc::new(InMemoryReviewQueue::new());
//! let orchestrator = RuntimeOrchestratorBuilder::new()
//!     .provider(Arc::new(AnthropicProvider::from_env()?))
//!     .sink(queue.clone())
//!     .build()?;
//!
//! let outcome = orchestrator.evaluate(EvaluationRequest::new(bytes)).await?;
//! ```

pub mod capabilities;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod review;
pub mod sources;

pub use capabilities::{
    AgentError, Capability, CriticAgent, ExtractionAgent, ExtractionValidationError,
    ExtractionValidator, LlmCritic, LlmExtractor,
};
pub use config::RuntimeConfig;
pub use orchestrator::{RuntimeError, RuntimeOrchestrator, RuntimeOrchestratorBuilder};
pub use providers::{
    ApiCredential, Completion, CompletionConfig, CredentialSource, LlmProvider, Prompt,
    ProviderError, TokenUsage,
};
#[cfg(feature = "anthropic")]
pub use providers::{AnthropicConfig, AnthropicProvider};
pub use resilience::{
    Admission, CircuitBreaker, CircuitBreakerConfig, CircuitState, CircuitStats, FallbackStrategy,
};
pub use review::{InMemoryReviewQueue, ReviewSink, SinkError, TracingSink};
pub use sources::{FetchError, Gathered, SourceFetcher, SourceGatherer, SourceSnapshot};
