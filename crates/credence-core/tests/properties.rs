//! Property tests for the invariants the engine must hold for any input.

use proptest::prelude::*;

use credence_core::graph::{SkillMention, SourceEvidence};
use credence_core::scanners::Scanner;
use credence_core::{
    EvidenceSource, EvidenceType, GraphBuilder, InvisibleContentDetector, LayeredText, Severity,
};

const SKILLS: &[&str] = &[
    "python",
    "rust",
    "go",
    "react",
    "docker",
    "dynamic-programming",
    "pytorch",
    "algorithms",
];

const TYPES: [EvidenceType; 4] = [
    EvidenceType::CodeEvidence,
    EvidenceType::BioEvidence,
    EvidenceType::AlgorithmicProof,
    EvidenceType::Claim,
];

fn source_evidence() -> impl Strategy<Value = SourceEvidence> {
    (
        0..EvidenceSource::ALL.len(),
        prop::collection::vec((0..SKILLS.len(), 0..TYPES.len()), 0..6),
    )
        .prop_map(|(source, mentions)| SourceEvidence {
            source: EvidenceSource::ALL[source],
            mentions: mentions
                .into_iter()
                .map(|(skill, t)| SkillMention {
                    skill: SKILLS[skill].to_string(),
                    evidence_type: TYPES[t],
                })
                .collect(),
        })
}

proptest! {
    #[test]
    fn test_identical_views_have_no_hidden_content(text in "\\PC{0,400}") {
        let layers = LayeredText::plain(&text);
        let finding = InvisibleContentDetector::default().scan(&layers);
        prop_assert_eq!(finding.severity, Severity::None);
        prop_assert_eq!(finding.detail_u64("hidden_word_count"), Some(0));
    }

    #[test]
    fn test_graph_is_independent_of_input_order(
        inputs in prop::collection::vec(source_evidence(), 0..5),
        shift in 0usize..5,
    ) {
        let builder = GraphBuilder::default();
        let forward = builder.build(&inputs, &[], &[]);

        let mut rotated = inputs.clone();
        if !rotated.is_empty() {
            let len = rotated.len();
            rotated.rotate_left(shift % len);
        }
        rotated.reverse();
        let shuffled = builder.build(&rotated, &[], &[]);

        prop_assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_rebuilding_from_same_inputs_is_identical(
        inputs in prop::collection::vec(source_evidence(), 0..5),
    ) {
        let builder = GraphBuilder::default();
        prop_assert_eq!(builder.build(&inputs, &[], &[]), builder.build(&inputs, &[], &[]));
    }

    #[test]
    fn test_confidence_stays_in_unit_interval(
        inputs in prop::collection::vec(source_evidence(), 0..5),
    ) {
        let graph = GraphBuilder::default().build(&inputs, &[], &[]);
        for node in graph.skills.values() {
            prop_assert!((0.0..=1.0).contains(&node.confidence));
        }
    }
}
