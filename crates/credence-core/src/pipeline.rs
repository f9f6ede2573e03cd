//! The evaluation pipeline.
//!
//! Stages run in a fixed order and each hands its output explicitly to the
//! next:
//!
//! ```text
//! bytes -> layers -> integrity gate -(block)-> outcome
//!                          |
//!                          +-> semantic screen -> claims -> graph -> decision
//! ```
//!
//! The staged API ([`Engine::begin`], [`PendingEvaluation::screen`],
//! [`AdmittedEvaluation::complete`]) lets an async caller obtain the critic
//! verdict and the external extraction between stages without the engine
//! itself doing any I/O.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claims::{ClaimExtractor, ClaimSet, ExternalExtractor};
use crate::critic::{Critic, CriticVerdict};
use crate::decision::{Decision, DecisionEngine, SubScores};
use crate::extract::{extract_layers, LayeredText};
use crate::gate::{Checkpoint, SecurityGate};
use crate::graph::{self, EvidenceGraph, GraphBuilder, SourceSnapshots};
use crate::identity::{strip_identity, PublicIdentity};
use crate::policy::Policy;
use crate::review::ReviewRequest;
use crate::types::{Degradation, SecurityFinding, SecurityReport};
use crate::EvaluationError;

/// Everything needed to evaluate one document.
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    /// Generated when absent
    pub evaluation_id: Option<String>,
    /// Used only to route review requests
    pub contact_id: Option<String>,
    pub document: Vec<u8>,
    /// Arbitrary identity record; stripped before it reaches the bundle
    pub identity: Option<serde_json::Map<String, serde_json::Value>>,
    pub sources: SourceSnapshots,
    /// Sub-scores computed upstream; they replace the built-in scorers
    pub sub_scores: SubScores,
}

impl EvaluationRequest {
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: document.into(),
            ..Self::default()
        }
    }

    pub fn with_evaluation_id(mut self, id: impl Into<String>) -> Self {
        self.evaluation_id = Some(id.into());
        self
    }

    pub fn with_contact_id(mut self, id: impl Into<String>) -> Self {
        self.contact_id = Some(id.into());
        self
    }

    pub fn with_identity(mut self, identity: serde_json::Map<String, serde_json::Value>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_sources(mut self, sources: SourceSnapshots) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_sub_scores(mut self, sub_scores: SubScores) -> Self {
        self.sub_scores = sub_scores;
        self
    }
}

/// Evidence assembled for an evaluation. Claims and graph are absent when
/// the document was blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub identity: PublicIdentity,
    pub security_report: SecurityReport,
    pub claims: Option<ClaimSet>,
    pub graph: Option<EvidenceGraph>,
}

/// How an evaluation ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EvaluationState {
    /// The integrity gate mandated `immediate_block`
    Blocked {
        finding: SecurityFinding,
        review_request_id: Uuid,
    },
    Decided { decision: Decision },
}

/// Final output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub evaluation_id: String,
    #[serde(flatten)]
    pub state: EvaluationState,
    pub bundle: EvidenceBundle,
    pub review_requests: Vec<ReviewRequest>,
    pub degradations: Vec<Degradation>,
}

impl EvaluationOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self.state, EvaluationState::Blocked { .. })
    }

    pub fn decision(&self) -> Option<&Decision> {
        match &self.state {
            EvaluationState::Decided { decision } => Some(decision),
            EvaluationState::Blocked { .. } => None,
        }
    }
}

/// The Evidence Trust Engine.
pub struct Engine {
    policy: Policy,
    gate: SecurityGate,
    claims: ClaimExtractor,
    graph: GraphBuilder,
    decision: DecisionEngine,
}

impl Engine {
    /// Create an engine; the policy is validated first.
    pub fn new(policy: Policy) -> Result<Self, EvaluationError> {
        policy.validate()?;
        Ok(Self::build(policy))
    }

    fn build(policy: Policy) -> Self {
        Self {
            gate: SecurityGate::new(&policy.integrity),
            claims: ClaimExtractor::new(&policy.claims),
            graph: GraphBuilder::new(&policy.graph),
            decision: DecisionEngine::new(&policy.decision),
            policy,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Extract the document layers and prepare the evaluation.
    pub fn begin(&self, request: EvaluationRequest) -> PendingEvaluation<'_> {
        let evaluation_id = request
            .evaluation_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let layers = extract_layers(&request.document);
        let identity = request
            .identity
            .as_ref()
            .map(strip_identity)
            .unwrap_or_default();

        tracing::info!(
            evaluation_id = %evaluation_id,
            bytes = request.document.len(),
            degraded = layers.mode.is_degraded(),
            "Evaluation started"
        );

        PendingEvaluation {
            engine: self,
            evaluation_id,
            contact_id: request.contact_id,
            identity,
            sources: request.sources,
            sub_scores: request.sub_scores,
            layers,
            degradations: Vec::new(),
        }
    }

    /// Run every stage synchronously.
    pub fn evaluate(
        &self,
        request: EvaluationRequest,
        critic: &dyn Critic,
        extractor: &dyn ExternalExtractor,
    ) -> EvaluationOutcome {
        let pending = self.begin(request);
        let verdict = critic.review(pending.layers());
        match pending.screen(&verdict) {
            Screened::Blocked(outcome) => outcome,
            Screened::Admitted(admitted) => admitted.complete(extractor),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(Policy::default())
    }
}

/// An evaluation whose layers are extracted but not yet screened.
pub struct PendingEvaluation<'e> {
    engine: &'e Engine,
    evaluation_id: String,
    contact_id: Option<String>,
    identity: PublicIdentity,
    sources: SourceSnapshots,
    sub_scores: SubScores,
    layers: LayeredText,
    degradations: Vec<Degradation>,
}

/// Result of the integrity gate.
pub enum Screened<'e> {
    Blocked(EvaluationOutcome),
    Admitted(AdmittedEvaluation<'e>),
}

impl<'e> PendingEvaluation<'e> {
    pub fn evaluation_id(&self) -> &str {
        &self.evaluation_id
    }

    pub fn layers(&self) -> &LayeredText {
        &self.layers
    }

    /// Public identity fields, safe to hand to source fetchers.
    pub fn identity(&self) -> &PublicIdentity {
        &self.identity
    }

    /// Snapshots already supplied with the request.
    pub fn sources(&self) -> &SourceSnapshots {
        &self.sources
    }

    /// Merge fetched snapshots. Snapshots supplied with the request win.
    pub fn add_sources(&mut self, fetched: SourceSnapshots) {
        if self.sources.code_hosting.is_none() {
            self.sources.code_hosting = fetched.code_hosting;
        }
        if self.sources.competitive_coding.is_none() {
            self.sources.competitive_coding = fetched.competitive_coding;
        }
        if self.sources.professional_network.is_none() {
            self.sources.professional_network = fetched.professional_network;
        }
    }

    /// Record a condition observed outside the engine (a failed source
    /// fetch, a timed-out critic).
    pub fn record_degradation(&mut self, degradation: Degradation) {
        self.degradations.push(degradation);
    }

    /// Run the integrity gate with the critic's verdict.
    pub fn screen(mut self, verdict: &CriticVerdict) -> Screened<'e> {
        let gate = self.engine.gate.screen(&self.layers, verdict);
        self.degradations.extend(gate.degradations);
        let report = gate.report;

        let blocking = report
            .is_blocked()
            .then(|| report.triggering_finding())
            .flatten()
            .cloned();

        if let Some(finding) = blocking {
            let mut review_requests = self.emit(&report, &[Checkpoint::ExtractionNotice]);
            let request = ReviewRequest::from_finding(
                Checkpoint::IntegrityGate,
                &finding,
                &self.evaluation_id,
                self.contact_id.as_deref(),
            );
            let review_request_id = request.request_id;
            review_requests.push(request);

            tracing::warn!(
                evaluation_id = %self.evaluation_id,
                detector = %finding.detector_name,
                severity = %finding.severity,
                "Evaluation blocked"
            );

            return Screened::Blocked(EvaluationOutcome {
                evaluation_id: self.evaluation_id,
                state: EvaluationState::Blocked {
                    finding,
                    review_request_id,
                },
                bundle: EvidenceBundle {
                    identity: self.identity,
                    security_report: report,
                    claims: None,
                    graph: None,
                },
                review_requests,
                degradations: self.degradations,
            });
        }

        let review_requests = self.emit(&report, &Checkpoint::ALL);
        Screened::Admitted(AdmittedEvaluation {
            pending: self,
            report,
            review_requests,
        })
    }

    /// One request per checkpoint that needs a human.
    fn emit(&self, report: &SecurityReport, checkpoints: &[Checkpoint]) -> Vec<ReviewRequest> {
        checkpoints
            .iter()
            .filter_map(|checkpoint| {
                checkpoint.trigger(report).map(|finding| {
                    tracing::info!(
                        evaluation_id = %self.evaluation_id,
                        checkpoint = checkpoint.as_str(),
                        detector = %finding.detector_name,
                        action = %finding.recommended_action,
                        "Review request emitted"
                    );
                    ReviewRequest::from_finding(
                        *checkpoint,
                        finding,
                        &self.evaluation_id,
                        self.contact_id.as_deref(),
                    )
                })
            })
            .collect()
    }
}

/// An evaluation that passed the integrity gate.
pub struct AdmittedEvaluation<'e> {
    pending: PendingEvaluation<'e>,
    report: SecurityReport,
    review_requests: Vec<ReviewRequest>,
}

impl<'e> AdmittedEvaluation<'e> {
    pub fn evaluation_id(&self) -> &str {
        &self.pending.evaluation_id
    }

    /// The screened text handed to claim extraction.
    pub fn text(&self) -> &str {
        &self.pending.layers.rendered_text
    }

    pub fn report(&self) -> &SecurityReport {
        &self.report
    }

    pub fn record_degradation(&mut self, degradation: Degradation) {
        self.pending.record_degradation(degradation);
    }

    /// Extract claims, build the graph and decide.
    pub fn complete(self, extractor: &dyn ExternalExtractor) -> EvaluationOutcome {
        let AdmittedEvaluation {
            pending,
            report,
            review_requests,
        } = self;
        let engine = pending.engine;
        let mut degradations = pending.degradations;

        let (claims, claim_degradations) = engine
            .claims
            .extract(&pending.layers.rendered_text, extractor);
        degradations.extend(claim_degradations);

        let inputs = graph::normalize(&claims, &pending.sources);
        let evidence = engine
            .graph
            .build(&inputs, &claims.experience, &claims.projects);

        let sub_scores = SubScores::compute(&claims, &pending.sources, &pending.sub_scores);
        let decision = engine
            .decision
            .decide(&evidence, &report, &sub_scores, !review_requests.is_empty());

        tracing::info!(
            evaluation_id = %pending.evaluation_id,
            confidence = decision.skill_confidence,
            degradations = degradations.len(),
            "Evaluation decided"
        );

        EvaluationOutcome {
            evaluation_id: pending.evaluation_id,
            state: EvaluationState::Decided { decision },
            bundle: EvidenceBundle {
                identity: pending.identity,
                security_report: report,
                claims: Some(claims),
                graph: Some(evidence),
            },
            review_requests,
            degradations,
        }
    }
}
