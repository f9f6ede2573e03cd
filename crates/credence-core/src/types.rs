//! Shared types for integrity scanning and pipeline bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::evidence::Evidence;
use crate::extract::ExtractionMode;

/// Severity of a security finding.
///
/// Ordered so that `max()` over findings yields the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline action mandated by a finding.
///
/// Ordered by strictness: the strictest action across findings wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    #[default]
    Proceed,
    FlagForReview,
    QueueForReview,
    ImmediateBlock,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::Proceed => "proceed",
            RecommendedAction::FlagForReview => "flag_for_review",
            RecommendedAction::QueueForReview => "queue_for_review",
            RecommendedAction::ImmediateBlock => "immediate_block",
        }
    }

    /// Whether this action hands the evaluation to a human.
    pub fn needs_human(&self) -> bool {
        !matches!(self, RecommendedAction::Proceed)
    }

    /// Whether this action halts every downstream stage.
    pub fn is_block(&self) -> bool {
        matches!(self, RecommendedAction::ImmediateBlock)
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured output of one content-integrity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    /// Component that produced the finding (e.g. `invisible_content_detector`)
    pub detector_name: String,

    /// What kind of problem was found (e.g. `hidden_text`)
    pub finding_type: String,

    pub severity: Severity,

    /// Snippets supporting the finding, for audit
    #[serde(default)]
    pub evidence: Vec<Evidence>,

    pub recommended_action: RecommendedAction,

    /// Detector-specific counters (hidden_word_count, match_count, ...)
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl SecurityFinding {
    /// A finding that found nothing.
    pub fn clear(detector_name: &str, finding_type: &str) -> Self {
        Self {
            detector_name: detector_name.to_string(),
            finding_type: finding_type.to_string(),
            severity: Severity::None,
            evidence: Vec::new(),
            recommended_action: RecommendedAction::Proceed,
            details: serde_json::Map::new(),
        }
    }

    pub fn with_outcome(mut self, severity: Severity, action: RecommendedAction) -> Self {
        self.severity = severity;
        self.recommended_action = action;
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Read a numeric detail, if present.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key).and_then(|v| v.as_u64())
    }

    pub fn is_clear(&self) -> bool {
        self.severity == Severity::None && self.recommended_action == RecommendedAction::Proceed
    }
}

/// Aggregate of all integrity findings for one document.
///
/// Compiled exactly once by [`crate::gate::SecurityGate`] and never mutated
/// afterwards; it is the audit artifact of the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub findings: Vec<SecurityFinding>,
    pub max_severity: Severity,
    pub final_action: RecommendedAction,
    pub extraction_mode: ExtractionMode,
    pub generated_at: DateTime<Utc>,
}

impl SecurityReport {
    pub fn is_blocked(&self) -> bool {
        self.final_action.is_block()
    }

    /// The finding that determined `final_action`: the first finding carrying
    /// the strictest action, ties broken by severity.
    pub fn triggering_finding(&self) -> Option<&SecurityFinding> {
        let mut best: Option<&SecurityFinding> = None;
        for finding in &self.findings {
            if finding.recommended_action != self.final_action || finding.is_clear() {
                continue;
            }
            // strictly greater keeps the earliest finding on ties
            if best.map_or(true, |b| finding.severity > b.severity) {
                best = Some(finding);
            }
        }
        best
    }

    pub fn finding(&self, detector_name: &str) -> Option<&SecurityFinding> {
        self.findings.iter().find(|f| f.detector_name == detector_name)
    }

    /// Whether any finding signals manipulation of the document.
    ///
    /// The degraded-extraction notice is a data-quality flag, not evidence of
    /// intent, so it does not count.
    pub fn has_manipulation_signal(&self) -> bool {
        self.findings.iter().any(|f| {
            f.severity > Severity::None && f.finding_type != crate::extract::DEGRADED_FINDING_TYPE
        })
    }
}

/// Kind of non-fatal condition recorded during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    /// Layout-aware extraction unavailable; rendered view equals full view
    ExtractionDegraded,
    /// No section passed the minimum length; windowed fallback used
    SegmentationEmpty,
    /// An optional capability (critic, extractor) timed out or failed
    CapabilityUnavailable,
    /// An evidence source could not be retrieved
    SourceUnavailable,
}

impl DegradationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationKind::ExtractionDegraded => "extraction_degraded",
            DegradationKind::SegmentationEmpty => "segmentation_empty",
            DegradationKind::CapabilityUnavailable => "capability_unavailable",
            DegradationKind::SourceUnavailable => "source_unavailable",
        }
    }
}

/// A recorded non-fatal condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub component: String,
    pub kind: DegradationKind,
    pub reason: String,
}

impl Degradation {
    pub fn new(component: impl Into<String>, kind: DegradationKind, reason: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            kind,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::None);
        assert_eq!(
            [Severity::Low, Severity::High, Severity::Medium].iter().max(),
            Some(&Severity::High)
        );
    }

    #[test]
    fn test_action_ordering() {
        assert!(RecommendedAction::ImmediateBlock > RecommendedAction::QueueForReview);
        assert!(RecommendedAction::QueueForReview > RecommendedAction::FlagForReview);
        assert!(!RecommendedAction::Proceed.needs_human());
        assert!(RecommendedAction::FlagForReview.needs_human());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RecommendedAction::QueueForReview).unwrap();
        assert_eq!(json, "\"queue_for_review\"");
        let sev: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(sev, Severity::Critical);
    }

    #[test]
    fn test_finding_builder() {
        let finding = SecurityFinding::clear("x", "hidden_text")
            .with_outcome(Severity::High, RecommendedAction::QueueForReview)
            .with_detail("hidden_word_count", 25);

        assert_eq!(finding.detail_u64("hidden_word_count"), Some(25));
        assert!(!finding.is_clear());
    }
}
