//! Runtime orchestrator.
//!
//! Drives the core's staged pipeline and supplies its external inputs:
//!
//! 1. `begin`: extract layers, strip identity
//! 2. fan-out via `tokio::join!`: critic review and source gathering
//! 3. `screen`: integrity gate with the critic's verdict
//! 4. external extraction on the screened text (admitted documents only)
//! 5. `complete`: claims, graph, decision
//! 6. submit review requests to every sink
//!
//! Each capability call is bounded by a timeout and guarded by a circuit
//! breaker. Failures take the configured [`FallbackStrategy`].

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use credence_core::{
    CapabilityError, CriticVerdict, Degradation, DegradationKind, Engine, EvaluationError,
    EvaluationOutcome, EvaluationRequest, ExternalExtraction, LayeredText, Policy,
    PrecomputedExtraction, Screened,
};

use crate::capabilities::{AgentError, Capability, CriticAgent, ExtractionAgent, LlmCritic, LlmExtractor};
use crate::config::RuntimeConfig;
use crate::providers::LlmProvider;
use crate::resilience::{Admission, CircuitBreaker, FallbackStrategy};
use crate::review::ReviewSink;
use crate::sources::{SourceFetcher, SourceGatherer};

/// Errors from the runtime orchestrator.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("{capability} failed: {reason}")]
    CapabilityFailed {
        capability: Capability,
        reason: String,
    },

    #[error(transparent)]
    Core(#[from] EvaluationError),
}

/// Async driver around a core [`Engine`].
pub struct RuntimeOrchestrator {
    engine: Engine,
    config: RuntimeConfig,
    circuit_breaker: CircuitBreaker,
    critic: Option<Arc<dyn CriticAgent>>,
    extractor: Option<Arc<dyn ExtractionAgent>>,
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    sinks: Vec<Arc<dyn ReviewSink>>,
}

impl RuntimeOrchestrator {
    /// Orchestrator with no capabilities: behaves like the core's
    /// synchronous `evaluate`.
    pub fn new(engine: Engine, config: RuntimeConfig) -> Self {
        let circuit_breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        Self {
            engine,
            config,
            circuit_breaker,
            critic: None,
            extractor: None,
            fetchers: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Evaluate one document.
    ///
    /// Errors only when the fallback strategy is `fail` and a capability
    /// failed; otherwise every failure is a degradation on the outcome.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationOutcome, RuntimeError> {
        let mut pending = self.engine.begin(request);
        let gatherer = SourceGatherer::from_config(&self.config);

        let (verdict, gathered) = tokio::join!(
            self.review(pending.layers()),
            gatherer.gather(&self.fetchers, pending.identity(), pending.sources()),
        );
        let verdict = verdict?;

        pending.add_sources(gathered.snapshots);
        for degradation in gathered.degradations {
            pending.record_degradation(degradation);
        }

        let mut outcome = match pending.screen(&verdict) {
            Screened::Blocked(outcome) => outcome,
            Screened::Admitted(admitted) => {
                let extraction = self.extract(admitted.text()).await?;
                admitted.complete(&extraction)
            }
        };

        self.submit(&mut outcome).await;
        Ok(outcome)
    }

    /// The critic's verdict. A failed call becomes an unavailable verdict,
    /// which the core records as a degradation.
    async fn review(&self, layers: &LayeredText) -> Result<CriticVerdict, RuntimeError> {
        let Some(critic) = &self.critic else {
            return Ok(CriticVerdict::Unavailable {
                reason: "no critic configured".to_string(),
            });
        };

        match self.guarded(Capability::Critic, critic.review(layers)).await {
            Ok(verdict) => Ok(verdict),
            Err(err) => Ok(CriticVerdict::from(self.fallback(Capability::Critic, err)?)),
        }
    }

    /// External extraction, packaged for the core's strategy chain.
    async fn extract(&self, text: &str) -> Result<PrecomputedExtraction, RuntimeError> {
        let Some(extractor) = &self.extractor else {
            return Ok(PrecomputedExtraction::new("none", Ok(ExternalExtraction::default())));
        };

        let result = match self.guarded(Capability::Extractor, extractor.extract(text)).await {
            Ok(extraction) => Ok(extraction),
            Err(err) => Err(self.fallback(Capability::Extractor, err)?),
        };
        Ok(PrecomputedExtraction::new(extractor.name(), result))
    }

    /// Run `call` behind the circuit breaker with the capability's timeout.
    async fn guarded<T>(
        &self,
        capability: Capability,
        call: impl Future<Output = Result<T, AgentError>>,
    ) -> Result<T, CapabilityError> {
        if let Admission::Skip {
            last_failure,
            retry_in,
        } = self.circuit_breaker.admit(capability)
        {
            tracing::warn!(capability = %capability, retry_in = ?retry_in, "Circuit open, skipping capability");
            return Err(CapabilityError::Unavailable(format!(
                "circuit open after repeated failures (last: {last_failure})"
            )));
        }

        let timeout = self.config.timeout(capability);
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => {
                self.circuit_breaker.record_success(capability);
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::warn!(capability = %capability, error = %e, "Capability failed");
                self.circuit_breaker.record_failure(capability, &e.to_string());
                Err(e.into())
            }
            Err(_) => {
                tracing::warn!(capability = %capability, timeout = ?timeout, "Capability timed out");
                self.circuit_breaker
                    .record_failure(capability, &format!("timed out after {timeout:?}"));
                Err(CapabilityError::Timeout(timeout.as_millis() as u64))
            }
        }
    }

    /// Apply the fallback strategy to a failed capability.
    fn fallback(&self, capability: Capability, err: CapabilityError) -> Result<CapabilityError, RuntimeError> {
        match self.config.fallback {
            FallbackStrategy::Deterministic => {
                tracing::info!(capability = %capability, "Falling back to deterministic behavior");
                Ok(err)
            }
            FallbackStrategy::Fail => Err(RuntimeError::CapabilityFailed {
                capability,
                reason: err.to_string(),
            }),
        }
    }

    /// Hand every review request to every sink. Sink failures are recorded,
    /// never retried.
    async fn submit(&self, outcome: &mut EvaluationOutcome) {
        for request in &outcome.review_requests {
            for sink in &self.sinks {
                if let Err(e) = sink.submit(request).await {
                    tracing::warn!(sink = sink.name(), error = %e, "Review sink failed");
                    outcome.degradations.push(Degradation::new(
                        sink.name(),
                        DegradationKind::CapabilityUnavailable,
                        e.to_string(),
                    ));
                }
            }
        }
    }
}

/// Builder for [`RuntimeOrchestrator`].
pub struct RuntimeOrchestratorBuilder {
    policy: Policy,
    config: RuntimeConfig,
    provider: Option<Arc<dyn LlmProvider>>,
    critic: Option<Arc<dyn CriticAgent>>,
    extractor: Option<Arc<dyn ExtractionAgent>>,
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    sinks: Vec<Arc<dyn ReviewSink>>,
}

impl RuntimeOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            policy: Policy::default(),
            config: RuntimeConfig::default(),
            provider: None,
            critic: None,
            extractor: None,
            fetchers: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an LLM provider for both the critic and the extractor, unless
    /// either is set explicitly.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn critic(mut self, critic: Arc<dyn CriticAgent>) -> Self {
        self.critic = Some(critic);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn ExtractionAgent>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn source(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ReviewSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the policy and build.
    pub fn build(self) -> Result<RuntimeOrchestrator, RuntimeError> {
        let engine = Engine::new(self.policy)?;
        let completion = self.config.completion.clone();

        let critic = self.critic.or_else(|| {
            self.provider
                .clone()
                .map(|p| Arc::new(LlmCritic::new(p, completion.clone())) as Arc<dyn CriticAgent>)
        });
        let extractor = self.extractor.or_else(|| {
            self.provider
                .clone()
                .map(|p| Arc::new(LlmExtractor::new(p, completion.clone())) as Arc<dyn ExtractionAgent>)
        });

        let mut orchestrator = RuntimeOrchestrator::new(engine, self.config);
        orchestrator.critic = critic;
        orchestrator.extractor = extractor;
        orchestrator.fetchers = self.fetchers;
        orchestrator.sinks = self.sinks;
        Ok(orchestrator)
    }
}

impl Default for RuntimeOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
