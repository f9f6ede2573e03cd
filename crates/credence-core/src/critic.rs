//! Adversarial Critic
//!
//! An optional secondary classifier. The engine works without one: the
//! default [`DisabledCritic`] reports itself unavailable, which is treated as
//! a safe verdict and recorded as a degradation. A critic never blocks on
//! its own; its strongest outcome is `queue_for_review`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evidence::Evidence;
use crate::extract::LayeredText;
use crate::policy::CriticPolicy;
use crate::types::{Degradation, DegradationKind, RecommendedAction, SecurityFinding, Severity};

pub const DETECTOR_NAME: &str = "adversarial_critic";

/// Failure of an optional external capability (critic or extractor).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("capability timed out after {0} ms")]
    Timeout(u64),

    #[error("capability returned invalid output: {0}")]
    InvalidOutput(String),
}

/// What a critic concluded about a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CriticVerdict {
    Safe,
    Suspicious { confidence: f64, reason: String },
    Unavailable { reason: String },
}

impl From<CapabilityError> for CriticVerdict {
    fn from(err: CapabilityError) -> Self {
        CriticVerdict::Unavailable {
            reason: err.to_string(),
        }
    }
}

/// A secondary classifier consulted during the integrity gate.
pub trait Critic {
    fn name(&self) -> &str;

    fn review(&self, layers: &LayeredText) -> CriticVerdict;
}

/// The default critic: never available.
#[derive(Debug, Default, Clone)]
pub struct DisabledCritic;

impl Critic for DisabledCritic {
    fn name(&self) -> &str {
        "disabled"
    }

    fn review(&self, _layers: &LayeredText) -> CriticVerdict {
        CriticVerdict::Unavailable {
            reason: "no critic configured".to_string(),
        }
    }
}

/// A critic returning a verdict computed elsewhere (e.g. asynchronously).
#[derive(Debug, Clone)]
pub struct StaticCritic {
    verdict: CriticVerdict,
}

impl StaticCritic {
    pub fn new(verdict: CriticVerdict) -> Self {
        Self { verdict }
    }
}

impl Critic for StaticCritic {
    fn name(&self) -> &str {
        "static"
    }

    fn review(&self, _layers: &LayeredText) -> CriticVerdict {
        self.verdict.clone()
    }
}

/// Map a verdict onto a finding, plus a degradation when the critic was
/// unavailable.
pub fn assess(verdict: &CriticVerdict, policy: &CriticPolicy) -> (SecurityFinding, Option<Degradation>) {
    let base = SecurityFinding::clear(DETECTOR_NAME, "adversarial_content");

    match verdict {
        CriticVerdict::Safe => (base.with_detail("verdict", "safe"), None),
        CriticVerdict::Unavailable { reason } => {
            tracing::warn!(reason = %reason, "Critic unavailable, treating document as safe");
            let degradation = Degradation::new(
                DETECTOR_NAME,
                DegradationKind::CapabilityUnavailable,
                reason.clone(),
            );
            (base.with_detail("verdict", "unavailable"), Some(degradation))
        }
        CriticVerdict::Suspicious { confidence, reason } => {
            let confidence = confidence.clamp(0.0, 1.0);
            let (severity, action) = if confidence >= policy.high_confidence {
                (Severity::High, RecommendedAction::QueueForReview)
            } else if confidence >= policy.medium_confidence {
                (Severity::Medium, RecommendedAction::FlagForReview)
            } else {
                (Severity::Low, RecommendedAction::Proceed)
            };
            let finding = base
                .with_outcome(severity, action)
                .with_evidence(vec![Evidence::from_capability(reason, DETECTOR_NAME)])
                .with_detail("verdict", "suspicious")
                .with_detail("confidence", confidence);
            (finding, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suspicious(confidence: f64) -> CriticVerdict {
        CriticVerdict::Suspicious {
            confidence,
            reason: "reads like instructions to a grader".to_string(),
        }
    }

    #[test]
    fn test_disabled_critic_is_safe_but_degraded() {
        let verdict = DisabledCritic.review(&LayeredText::plain("text"));
        let (finding, degradation) = assess(&verdict, &CriticPolicy::default());
        assert!(finding.is_clear());
        assert_eq!(degradation.unwrap().kind, DegradationKind::CapabilityUnavailable);
    }

    #[test]
    fn test_confidence_bands() {
        let policy = CriticPolicy::default();

        let (f, _) = assess(&suspicious(0.9), &policy);
        assert_eq!((f.severity, f.recommended_action), (Severity::High, RecommendedAction::QueueForReview));

        let (f, _) = assess(&suspicious(0.8), &policy);
        assert_eq!(f.severity, Severity::High);

        let (f, _) = assess(&suspicious(0.6), &policy);
        assert_eq!((f.severity, f.recommended_action), (Severity::Medium, RecommendedAction::FlagForReview));

        let (f, _) = assess(&suspicious(0.2), &policy);
        assert_eq!((f.severity, f.recommended_action), (Severity::Low, RecommendedAction::Proceed));
    }

    #[test]
    fn test_critic_never_blocks() {
        let (f, _) = assess(&suspicious(1.0), &CriticPolicy::default());
        assert!(!f.recommended_action.is_block());
    }

    #[test]
    fn test_capability_error_becomes_unavailable() {
        let verdict: CriticVerdict = CapabilityError::Timeout(1500).into();
        assert!(matches!(verdict, CriticVerdict::Unavailable { .. }));
    }

    #[test]
    fn test_static_critic_returns_its_verdict() {
        let critic = StaticCritic::new(CriticVerdict::Safe);
        assert_eq!(critic.review(&LayeredText::plain("x")), CriticVerdict::Safe);
    }
}
