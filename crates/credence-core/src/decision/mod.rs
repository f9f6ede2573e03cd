//! Skill Decision Engine
//!
//! Turns the evidence graph and per-source sub-scores into the final trust
//! decision:
//! 1. Portfolio score: weighted mean of present sub-scores
//! 2. Manipulation penalty if the security report carries any signal
//! 3. Conflict penalty per flag, bounded below by a floor
//! 4. Thresholds map the result to a signal strength
//!
//! The decision reads the graph and never mutates it.

pub mod scoring;
pub mod tiers;

pub use scoring::SubScores;
pub use tiers::{SkillTier, TieredSkills};

use serde::{Deserialize, Serialize};

use crate::graph::{EvidenceGraph, EvidenceSource};
use crate::policy::DecisionPolicy;
use crate::types::SecurityReport;

/// Strength of the overall evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Strong,
    Weak,
    None,
}

impl SignalStrength {
    pub fn from_confidence(confidence: f64, policy: &DecisionPolicy) -> Self {
        if confidence >= policy.strong_threshold {
            SignalStrength::Strong
        } else if confidence >= policy.weak_threshold {
            SignalStrength::Weak
        } else {
            SignalStrength::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "strong",
            SignalStrength::Weak => "weak",
            SignalStrength::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Verified,
    Provisional,
    Unverified,
    /// A review checkpoint is open for this evaluation
    UnderReview,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStatus::Verified => "verified",
            CredentialStatus::Provisional => "provisional",
            CredentialStatus::Unverified => "unverified",
            CredentialStatus::UnderReview => "under_review",
        }
    }
}

/// Multipliers applied to the portfolio score. `None` when not applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Penalties {
    pub manipulation: Option<f64>,
    pub conflict: Option<f64>,
}

impl Penalties {
    pub fn multiplier(&self) -> f64 {
        self.manipulation.unwrap_or(1.0) * self.conflict.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    pub sources_present: Vec<EvidenceSource>,
    pub missing_signals: Vec<EvidenceSource>,
    pub total_skills: usize,
    /// Skills with at least one non-claim evidence type
    pub corroborated_skills: usize,
    pub weak_signals: usize,
    pub conflict_flags: usize,
    pub manipulation_detected: bool,
}

/// The final trust decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// 0-100
    pub skill_confidence: f64,
    pub signal_strength: SignalStrength,
    pub credential_status: CredentialStatus,
    pub test_required: bool,
    pub skills: TieredSkills,
    pub evidence_summary: EvidenceSummary,
    pub sub_scores: SubScores,
    /// Before penalties
    pub portfolio_score: f64,
    pub penalties: Penalties,
}

/// The Skill Decision Engine.
pub struct DecisionEngine {
    policy: DecisionPolicy,
}

impl DecisionEngine {
    pub fn new(policy: &DecisionPolicy) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Decide from a finished graph.
    ///
    /// `review_open` is set when any checkpoint emitted a review request.
    pub fn decide(
        &self,
        graph: &EvidenceGraph,
        report: &SecurityReport,
        sub_scores: &SubScores,
        review_open: bool,
    ) -> Decision {
        let portfolio_score = sub_scores.portfolio(&self.policy.weights);
        let manipulation_detected = report.has_manipulation_signal();
        let penalties = self.penalties(manipulation_detected, graph.conflict_flags.len());

        let skill_confidence = round2((portfolio_score * penalties.multiplier()).clamp(0.0, 100.0));
        let signal_strength = SignalStrength::from_confidence(skill_confidence, &self.policy);

        let credential_status = if review_open {
            CredentialStatus::UnderReview
        } else {
            match signal_strength {
                SignalStrength::Strong => CredentialStatus::Verified,
                SignalStrength::Weak => CredentialStatus::Provisional,
                SignalStrength::None => CredentialStatus::Unverified,
            }
        };

        let evidence_summary = EvidenceSummary {
            sources_present: graph.present_sources(),
            missing_signals: graph.missing_signals.clone(),
            total_skills: graph.skills.len(),
            corroborated_skills: graph
                .skills
                .values()
                .filter(|n| n.evidence_types.iter().any(|t| t.corroborates()))
                .count(),
            weak_signals: graph.weak_signals.len(),
            conflict_flags: graph.conflict_flags.len(),
            manipulation_detected,
        };

        tracing::info!(
            portfolio = portfolio_score,
            confidence = skill_confidence,
            strength = signal_strength.as_str(),
            review_open,
            "Decision rendered"
        );

        Decision {
            skill_confidence,
            signal_strength,
            credential_status,
            test_required: signal_strength != SignalStrength::Strong,
            skills: TieredSkills::from_skills(graph.skills.keys().map(String::as_str)),
            evidence_summary,
            sub_scores: *sub_scores,
            portfolio_score,
            penalties,
        }
    }

    fn penalties(&self, manipulation_detected: bool, conflicts: usize) -> Penalties {
        let conflict = (conflicts > 0).then(|| {
            let exponent = i32::try_from(conflicts).unwrap_or(i32::MAX);
            self.policy
                .conflict_penalty
                .powi(exponent)
                .max(self.policy.conflict_penalty_floor)
        });
        Penalties {
            manipulation: manipulation_detected.then_some(self.policy.manipulation_penalty),
            conflict,
        }
    }
}

/// Scores are compared against thresholds at two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(&DecisionPolicy::default())
    }
}
