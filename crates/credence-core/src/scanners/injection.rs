//! Pattern Injection Scanner
//!
//! **Question**: Does the document try to instruct the system evaluating it?
//!
//! Runs the fixed injection catalogue over the full view, so hidden text is
//! scanned as well as visible text.

use crate::evidence::Evidence;
use crate::extract::LayeredText;
use crate::policy::InjectionPolicy;
use crate::types::{RecommendedAction, SecurityFinding, Severity};

use super::patterns::INJECTION_PATTERNS;
use super::Scanner;

pub const DETECTOR_NAME: &str = "pattern_injection_scanner";

struct Match {
    pattern_id: &'static str,
    critical: bool,
    start: usize,
    end: usize,
}

/// The Pattern Injection scanner.
pub struct PatternInjectionScanner {
    policy: InjectionPolicy,
}

impl PatternInjectionScanner {
    pub fn new(policy: &InjectionPolicy) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    fn find_matches(&self, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();
        for pattern in INJECTION_PATTERNS.iter() {
            for m in pattern.regex.find_iter(text) {
                matches.push(Match {
                    pattern_id: pattern.id,
                    critical: pattern.category.is_critical(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        matches.sort_by_key(|m| m.start);
        matches
    }

    fn classify(&self, total: usize, any_critical: bool) -> (Severity, RecommendedAction) {
        let p = &self.policy;
        if any_critical || total >= p.critical_match_count {
            (Severity::Critical, RecommendedAction::ImmediateBlock)
        } else if total >= p.high_match_count {
            (Severity::High, RecommendedAction::QueueForReview)
        } else if total >= 1 {
            (Severity::Medium, RecommendedAction::FlagForReview)
        } else {
            (Severity::None, RecommendedAction::Proceed)
        }
    }
}

impl Default for PatternInjectionScanner {
    fn default() -> Self {
        Self::new(&InjectionPolicy::default())
    }
}

impl Scanner for PatternInjectionScanner {
    fn name(&self) -> &'static str {
        DETECTOR_NAME
    }

    fn scan(&self, layers: &LayeredText) -> SecurityFinding {
        let text = &layers.full_text;
        let matches = self.find_matches(text);
        let any_critical = matches.iter().any(|m| m.critical);
        let (severity, action) = self.classify(matches.len(), any_critical);

        if !matches.is_empty() {
            tracing::info!(
                match_count = matches.len(),
                critical = any_critical,
                "Injection patterns matched"
            );
        }

        let evidence: Vec<Evidence> = matches
            .iter()
            .take(self.policy.max_evidence)
            .map(|m| Evidence::from_full_text(&text[m.start..m.end], m.start, m.end))
            .collect();

        let mut pattern_ids: Vec<&str> = matches.iter().map(|m| m.pattern_id).collect();
        pattern_ids.sort_unstable();
        pattern_ids.dedup();

        SecurityFinding::clear(DETECTOR_NAME, "prompt_injection")
            .with_outcome(severity, action)
            .with_evidence(evidence)
            .with_detail("match_count", matches.len())
            .with_detail("injection_detected", !matches.is_empty())
            .with_detail("critical_pattern", any_critical)
            .with_detail("patterns", pattern_ids)
    }
}
