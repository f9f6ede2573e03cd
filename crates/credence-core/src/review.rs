//! Human-review handoff.
//!
//! A checkpoint whose strictest finding needs a human emits one
//! [`ReviewRequest`]. Emission is write-only: the engine never reads a
//! request back or waits for its resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gate::Checkpoint;
use crate::types::{RecommendedAction, SecurityFinding, Severity};

/// A request for a human to look at an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub request_id: Uuid,
    /// Contact id when known, otherwise the evaluation id
    pub subject_id: String,
    /// Detector whose finding raised the request
    pub triggered_by: String,
    pub severity: Severity,
    pub reason: String,
    pub action_taken: RecommendedAction,
    pub evidence: serde_json::Value,
    /// Evaluation the request belongs to
    pub context_id: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewRequest {
    /// Build the request for `checkpoint` from its triggering finding.
    pub fn from_finding(
        checkpoint: Checkpoint,
        finding: &SecurityFinding,
        evaluation_id: &str,
        contact_id: Option<&str>,
    ) -> Self {
        let evidence = serde_json::json!({
            "checkpoint": checkpoint.as_str(),
            "finding_type": finding.finding_type,
            "snippets": finding.evidence,
            "details": finding.details,
        });

        Self {
            request_id: Uuid::new_v4(),
            subject_id: contact_id
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(evaluation_id)
                .to_string(),
            triggered_by: finding.detector_name.clone(),
            severity: finding.severity,
            reason: reason(checkpoint, finding),
            action_taken: finding.recommended_action,
            evidence,
            context_id: evaluation_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

fn reason(checkpoint: Checkpoint, finding: &SecurityFinding) -> String {
    let verb = match finding.recommended_action {
        RecommendedAction::ImmediateBlock => "blocked",
        RecommendedAction::QueueForReview => "queued for review",
        RecommendedAction::FlagForReview | RecommendedAction::Proceed => "flagged",
    };
    format!(
        "{} {} by {} ({} severity {})",
        checkpoint.as_str(),
        verb,
        finding.detector_name,
        finding.finding_type,
        finding.severity
    )
}
