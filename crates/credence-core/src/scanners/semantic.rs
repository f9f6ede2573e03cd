//! Semantic Evasion Detector
//!
//! Two independent checks, combined by max severity:
//!
//! | Check | Input | Outcome |
//! |-------|-------|---------|
//! | Semantic injection | full view | medium / flag_for_review |
//! | Steganographic styling | style layer | high / queue_for_review |
//!
//! The styling check is skipped when the format has no style layer. Neither
//! check can block.

use crate::evidence::Evidence;
use crate::extract::{LayeredText, StyleHint};
use crate::types::{RecommendedAction, SecurityFinding, Severity};

use super::patterns::SEMANTIC_PHRASES;
use super::Scanner;

pub const DETECTOR_NAME: &str = "semantic_evasion_detector";

const MAX_EVIDENCE: usize = 5;

/// The Semantic Evasion detector.
#[derive(Default)]
pub struct SemanticEvasionDetector;

impl SemanticEvasionDetector {
    pub fn new() -> Self {
        Self
    }

    fn semantic_matches(&self, text: &str) -> Vec<Evidence> {
        let mut found: Vec<(usize, usize)> = SEMANTIC_PHRASES
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
            .collect();
        found.sort_unstable();
        found
            .into_iter()
            .map(|(start, end)| Evidence::from_full_text(&text[start..end], start, end))
            .collect()
    }

    fn steganographic_hints<'a>(&self, hints: &'a [StyleHint]) -> Vec<&'a StyleHint> {
        hints.iter().filter(|h| h.technique.is_steganographic()).collect()
    }
}

impl Scanner for SemanticEvasionDetector {
    fn name(&self) -> &'static str {
        DETECTOR_NAME
    }

    fn scan(&self, layers: &LayeredText) -> SecurityFinding {
        let semantic = self.semantic_matches(&layers.full_text);

        let (styling, styling_checked) = match &layers.style_layer {
            Some(hints) => (self.steganographic_hints(hints), true),
            None => (Vec::new(), false),
        };

        let mut severity = Severity::None;
        let mut action = RecommendedAction::Proceed;
        let mut finding_type = "semantic_evasion";

        if !semantic.is_empty() {
            severity = Severity::Medium;
            action = RecommendedAction::FlagForReview;
            finding_type = "semantic_injection";
        }
        if !styling.is_empty() {
            severity = Severity::High;
            action = RecommendedAction::QueueForReview;
            finding_type = "steganographic_styling";
        }

        let mut techniques: Vec<&str> = styling.iter().map(|h| h.technique.as_str()).collect();
        techniques.sort_unstable();
        techniques.dedup();

        let mut evidence: Vec<Evidence> = styling
            .iter()
            .map(|h| Evidence::from_markup(&format!("{} ({})", h.text_preview, h.declaration), &h.element))
            .collect();
        evidence.extend(semantic.iter().cloned());
        evidence.truncate(MAX_EVIDENCE);

        if severity > Severity::None {
            tracing::info!(
                semantic_matches = semantic.len(),
                styling_hints = styling.len(),
                "Semantic evasion signals found"
            );
        }

        SecurityFinding::clear(DETECTOR_NAME, finding_type)
            .with_outcome(severity, action)
            .with_evidence(evidence)
            .with_detail("semantic_matches", semantic.len())
            .with_detail("styling_hints", styling.len())
            .with_detail("styling_checked", styling_checked)
            .with_detail("techniques", techniques)
    }
}
