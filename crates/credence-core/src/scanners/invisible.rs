//! Invisible-Content Detector
//!
//! **Question**: Does the document carry words a human reader never sees?
//!
//! Hidden words are the multiset difference between the full view and the
//! rendered view. Hidden occurrences of suspicious keywords escalate the
//! severity; sheer hidden volume escalates it on its own.

use std::collections::{HashMap, HashSet};

use crate::evidence::Evidence;
use crate::extract::LayeredText;
use crate::policy::InvisiblePolicy;
use crate::types::{RecommendedAction, SecurityFinding, Severity};

use super::patterns::{suspicious_keywords, words};
use super::Scanner;

pub const DETECTOR_NAME: &str = "invisible_content_detector";

const SAMPLE_WORDS: usize = 20;

/// The Invisible-Content detector.
pub struct InvisibleContentDetector {
    policy: InvisiblePolicy,
    keywords: HashSet<String>,
}

impl InvisibleContentDetector {
    pub fn new(policy: &InvisiblePolicy) -> Self {
        Self {
            keywords: suspicious_keywords(&policy.extra_suspicious_keywords),
            policy: policy.clone(),
        }
    }

    /// Words present in `full` but not in `rendered`, counted per occurrence,
    /// in document order.
    pub fn hidden_words(rendered: &str, full: &str) -> Vec<String> {
        let mut visible: HashMap<String, usize> = HashMap::new();
        for word in words(rendered) {
            *visible.entry(word).or_insert(0) += 1;
        }

        let mut hidden = Vec::new();
        for word in words(full) {
            match visible.get_mut(&word) {
                Some(count) if *count > 0 => *count -= 1,
                _ => hidden.push(word),
            }
        }
        hidden
    }

    fn classify(&self, hidden_count: usize, matches: usize) -> (Severity, RecommendedAction) {
        let p = &self.policy;
        if matches >= p.critical_matches || hidden_count > p.critical_hidden_words {
            (Severity::Critical, RecommendedAction::ImmediateBlock)
        } else if matches >= p.high_matches || hidden_count > p.high_hidden_words {
            (Severity::High, RecommendedAction::QueueForReview)
        } else if hidden_count > p.medium_hidden_words {
            (Severity::Medium, RecommendedAction::FlagForReview)
        } else {
            (Severity::None, RecommendedAction::Proceed)
        }
    }
}

impl Default for InvisibleContentDetector {
    fn default() -> Self {
        Self::new(&InvisiblePolicy::default())
    }
}

impl Scanner for InvisibleContentDetector {
    fn name(&self) -> &'static str {
        DETECTOR_NAME
    }

    fn scan(&self, layers: &LayeredText) -> SecurityFinding {
        let hidden = Self::hidden_words(&layers.rendered_text, &layers.full_text);

        let matched: Vec<&String> = hidden.iter().filter(|w| self.keywords.contains(*w)).collect();
        let mut distinct: Vec<&str> = matched.iter().map(|w| w.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let (severity, action) = self.classify(hidden.len(), matched.len());

        tracing::debug!(
            hidden_words = hidden.len(),
            suspicious_matches = matched.len(),
            severity = %severity,
            "Invisible-content scan complete"
        );

        let sample: Vec<String> = hidden.iter().take(SAMPLE_WORDS).cloned().collect();
        let evidence = if hidden.is_empty() {
            Vec::new()
        } else {
            vec![Evidence::from_hidden_words(&sample)]
        };

        SecurityFinding::clear(DETECTOR_NAME, "hidden_text")
            .with_outcome(severity, action)
            .with_evidence(evidence)
            .with_detail("hidden_word_count", hidden.len())
            .with_detail("suspicious_matches", matched.len())
            .with_detail("matched_keywords", distinct)
            .with_detail("sample_hidden_words", sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{DocumentFormat, ExtractionMode};

    fn layers(rendered: &str, full: &str) -> LayeredText {
        LayeredText {
            format: DocumentFormat::Html,
            rendered_text: rendered.to_string(),
            full_text: full.to_string(),
            mode: ExtractionMode::LayoutAware,
            style_layer: Some(vec![]),
        }
    }

    #[test]
    fn test_identical_views_are_clear() {
        let text = "senior python expert hire candidate score top perfect";
        let finding = InvisibleContentDetector::default().scan(&layers(text, text));
        assert_eq!(finding.severity, Severity::None);
        assert_eq!(finding.recommended_action, RecommendedAction::Proceed);
        assert_eq!(finding.detail_u64("hidden_word_count"), Some(0));
    }

    #[test]
    fn test_multiset_difference_counts_repeats() {
        let hidden = InvisibleContentDetector::hidden_words("rust rust", "rust rust rust go");
        assert_eq!(hidden, vec!["rust", "go"]);
    }

    #[test]
    fn test_five_hidden_keywords_is_critical() {
        let full = "Visible text. senior python expert hire perfect";
        let finding = InvisibleContentDetector::default().scan(&layers("Visible text.", full));
        assert_eq!(finding.detail_u64("suspicious_matches"), Some(5));
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.recommended_action, RecommendedAction::ImmediateBlock);
    }

    #[test]
    fn test_two_matches_is_high() {
        let full = "Visible. python senior";
        let finding = InvisibleContentDetector::default().scan(&layers("Visible.", full));
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.recommended_action, RecommendedAction::QueueForReview);
    }

    #[test]
    fn test_volume_without_keywords() {
        let filler: Vec<String> = (0..21).map(|i| format!("filler{}", i)).collect();
        let full = format!("Visible. {}", filler.join(" "));
        let finding = InvisibleContentDetector::default().scan(&layers("Visible.", &full));
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.recommended_action, RecommendedAction::FlagForReview);

        let filler: Vec<String> = (0..101).map(|i| format!("filler{}", i)).collect();
        let full = format!("Visible. {}", filler.join(" "));
        let finding = InvisibleContentDetector::default().scan(&layers("Visible.", &full));
        assert_eq!(finding.severity, Severity::Critical);
    }

    #[test]
    fn test_sample_is_capped() {
        let filler: Vec<String> = (0..30).map(|i| format!("w{}", i)).collect();
        let finding = InvisibleContentDetector::default().scan(&layers("", &filler.join(" ")));
        let sample = finding.details["sample_hidden_words"].as_array().unwrap();
        assert_eq!(sample.len(), 20);
    }
}
