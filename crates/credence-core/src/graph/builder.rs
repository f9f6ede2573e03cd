//! Evidence Graph Builder
//!
//! Merges every source's canonical evidence into one graph:
//! 1. Each distinct source contributes its fixed weight to a skill once
//! 2. Ontology expansion derives broader skills with decayed confidence
//! 3. Languages supported only by self-reported claims are flagged
//!
//! Inputs are merged in canonical source order and every collection is
//! ordered, so the result does not depend on input order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::claims::{ExperienceEntry, ProjectEntry};
use crate::policy::GraphPolicy;
use crate::types::Severity;

use super::adapter::SourceEvidence;
use super::ontology;
use super::sources::{EvidenceSource, EvidenceType};

pub const SKILL_CLAIM_WITHOUT_CODE: &str = "skill_claim_without_code";

/// One skill and everything that supports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNode {
    pub name: String,
    pub sources: BTreeSet<EvidenceSource>,
    pub evidence_types: BTreeSet<EvidenceType>,
    /// In [0, 1]
    pub confidence: f64,
    /// Parent skill this one was inferred from
    pub derived_from: Option<String>,
    /// Set when ontology expansion produced or reinforced this node
    pub ontology_derived: bool,
}

/// Warning that a claimed skill lacks independent corroboration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictFlag {
    #[serde(rename = "type")]
    pub flag_type: String,
    pub skill: String,
    pub issue: String,
    pub severity: Severity,
}

/// The fused evidence for one evaluation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceGraph {
    pub skills: BTreeMap<String, SkillNode>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    /// Sources that contributed nothing because they were absent
    pub missing_signals: Vec<EvidenceSource>,
    /// Skills below the minimum confidence, kept but marked
    pub weak_signals: Vec<String>,
    pub conflict_flags: Vec<ConflictFlag>,
}

impl EvidenceGraph {
    pub fn skill(&self, name: &str) -> Option<&SkillNode> {
        self.skills.get(name)
    }

    /// Sources that supplied input, in canonical order.
    pub fn present_sources(&self) -> Vec<EvidenceSource> {
        EvidenceSource::ALL
            .iter()
            .copied()
            .filter(|s| !self.missing_signals.contains(s))
            .collect()
    }
}

/// The Evidence Graph Builder.
pub struct GraphBuilder {
    policy: GraphPolicy,
}

impl GraphBuilder {
    pub fn new(policy: &GraphPolicy) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Build a graph from normalized source evidence.
    ///
    /// A source appearing more than once is merged; a source not appearing
    /// at all is listed in `missing_signals`.
    pub fn build(
        &self,
        inputs: &[SourceEvidence],
        experience: &[ExperienceEntry],
        projects: &[ProjectEntry],
    ) -> EvidenceGraph {
        // skill -> source -> evidence types
        let mut support: BTreeMap<String, BTreeMap<EvidenceSource, BTreeSet<EvidenceType>>> =
            BTreeMap::new();
        let mut seen_sources: BTreeSet<EvidenceSource> = BTreeSet::new();

        for input in inputs {
            seen_sources.insert(input.source);
            for mention in &input.mentions {
                support
                    .entry(mention.skill.clone())
                    .or_default()
                    .entry(input.source)
                    .or_default()
                    .insert(mention.evidence_type);
            }
        }

        let mut skills: BTreeMap<String, SkillNode> = support
            .into_iter()
            .map(|(name, by_source)| {
                let sources: BTreeSet<EvidenceSource> = by_source.keys().copied().collect();
                let evidence_types: BTreeSet<EvidenceType> =
                    by_source.values().flatten().copied().collect();
                let node = SkillNode {
                    confidence: self.confidence(&sources),
                    name: name.clone(),
                    sources,
                    evidence_types,
                    derived_from: None,
                    ontology_derived: false,
                };
                (name, node)
            })
            .collect();

        self.expand_ontology(&mut skills);

        let weak_signals = skills
            .values()
            .filter(|n| n.confidence < self.policy.min_confidence)
            .map(|n| n.name.clone())
            .collect();

        let conflict_flags = detect_conflicts(&skills);

        let missing_signals = EvidenceSource::ALL
            .iter()
            .copied()
            .filter(|s| !seen_sources.contains(s))
            .collect();

        let graph = EvidenceGraph {
            skills,
            experience: experience.to_vec(),
            projects: projects.to_vec(),
            missing_signals,
            weak_signals,
            conflict_flags,
        };

        tracing::info!(
            skills = graph.skills.len(),
            weak = graph.weak_signals.len(),
            conflicts = graph.conflict_flags.len(),
            missing = graph.missing_signals.len(),
            "Evidence graph built"
        );

        graph
    }

    /// Sum of the weights of distinct sources over the full canonical weight
    /// set. Summed in canonical order so the result is order-independent.
    fn confidence(&self, sources: &BTreeSet<EvidenceSource>) -> f64 {
        let weights = &self.policy.weights;
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }
        let sum: f64 = sources.iter().map(|s| s.weight(weights)).sum();
        (sum / total).clamp(0.0, 1.0)
    }

    /// One pass over the directly supported skills; derived skills are not
    /// expanded again.
    fn expand_ontology(&self, skills: &mut BTreeMap<String, SkillNode>) {
        let mut derived: BTreeMap<&'static str, (f64, String)> = BTreeMap::new();

        for node in skills.values().filter(|n| !n.ontology_derived) {
            let candidate = node.confidence * self.policy.ontology_decay;
            for broader in ontology::implied_by(&node.name) {
                let better = derived
                    .get(broader)
                    .map_or(true, |(best, _)| candidate > *best);
                if better {
                    derived.insert(broader, (candidate, node.name.clone()));
                }
            }
        }

        for (broader, (confidence, parent)) in derived {
            match skills.get_mut(broader) {
                Some(existing) => {
                    existing.confidence = existing.confidence.max(confidence);
                    existing.ontology_derived = true;
                    existing.derived_from.get_or_insert(parent);
                }
                None => {
                    let (sources, evidence_types) = skills
                        .get(&parent)
                        .map(|p| (p.sources.clone(), p.evidence_types.clone()))
                        .unwrap_or_default();
                    skills.insert(
                        broader.to_string(),
                        SkillNode {
                            name: broader.to_string(),
                            sources,
                            evidence_types,
                            confidence,
                            derived_from: Some(parent),
                            ontology_derived: true,
                        },
                    );
                }
            }
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(&GraphPolicy::default())
    }
}

/// Flag recognized languages whose only evidence is self-reported.
fn detect_conflicts(skills: &BTreeMap<String, SkillNode>) -> Vec<ConflictFlag> {
    skills
        .values()
        .filter(|n| !n.ontology_derived && ontology::is_language(&n.name))
        .filter(|n| !n.evidence_types.iter().any(EvidenceType::corroborates))
        .map(|n| ConflictFlag {
            flag_type: SKILL_CLAIM_WITHOUT_CODE.to_string(),
            skill: n.name.clone(),
            issue: format!(
                "{} is claimed but no code, bio or algorithmic evidence supports it",
                n.name
            ),
            severity: Severity::Medium,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::adapter::SkillMention;

    fn source(source: EvidenceSource, mentions: &[(&str, EvidenceType)]) -> SourceEvidence {
        SourceEvidence {
            source,
            mentions: mentions
                .iter()
                .map(|(s, t)| SkillMention {
                    skill: s.to_string(),
                    evidence_type: *t,
                })
                .collect(),
        }
    }

    fn build(inputs: &[SourceEvidence]) -> EvidenceGraph {
        GraphBuilder::default().build(inputs, &[], &[])
    }

    #[test]
    fn test_confidence_sums_distinct_sources() {
        let graph = build(&[
            source(EvidenceSource::Document, &[("rust", EvidenceType::Claim)]),
            source(
                EvidenceSource::CodeHosting,
                &[("rust", EvidenceType::CodeEvidence), ("rust", EvidenceType::BioEvidence)],
            ),
        ]);
        let rust = graph.skill("rust").unwrap();
        assert!((rust.confidence - 0.55).abs() < 1e-9);
        assert_eq!(rust.sources.len(), 2);
        assert_eq!(rust.evidence_types.len(), 3);
    }

    #[test]
    fn test_language_claim_without_code_is_flagged_framework_is_not() {
        let graph = build(&[source(
            EvidenceSource::Document,
            &[("python", EvidenceType::Claim), ("react", EvidenceType::Claim)],
        )]);
        assert_eq!(graph.conflict_flags.len(), 1);
        assert_eq!(graph.conflict_flags[0].skill, "python");
        assert_eq!(graph.conflict_flags[0].flag_type, SKILL_CLAIM_WITHOUT_CODE);
    }

    #[test]
    fn test_weak_signals_kept() {
        let graph = build(&[source(EvidenceSource::Document, &[("figma", EvidenceType::Claim)])]);
        assert!(graph.skill("figma").is_some());
        assert_eq!(graph.weak_signals, vec!["figma"]);
        assert_eq!(
            graph.missing_signals,
            vec![
                EvidenceSource::CodeHosting,
                EvidenceSource::CompetitiveCoding,
                EvidenceSource::ProfessionalNetwork
            ]
        );
    }

    #[test]
    fn test_ontology_derives_with_decay() {
        let graph = build(&[source(
            EvidenceSource::CompetitiveCoding,
            &[("dynamic-programming", EvidenceType::AlgorithmicProof)],
        )]);
        let algorithms = graph.skill("algorithms").unwrap();
        assert!(algorithms.ontology_derived);
        assert_eq!(algorithms.derived_from.as_deref(), Some("dynamic-programming"));
        assert!((algorithms.confidence - 0.25 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_existing_node_keeps_higher_confidence_and_is_exempt() {
        let graph = build(&[
            source(
                EvidenceSource::Document,
                &[("algorithms", EvidenceType::Claim)],
            ),
            source(
                EvidenceSource::CodeHosting,
                &[("graph-algorithms", EvidenceType::CodeEvidence)],
            ),
        ]);
        let algorithms = graph.skill("algorithms").unwrap();
        assert!((algorithms.confidence - 0.40 * 0.8).abs() < 1e-9);
        assert!(algorithms.ontology_derived);
    }

    #[test]
    fn test_merge_order_is_irrelevant() {
        let a = source(EvidenceSource::Document, &[("python", EvidenceType::Claim), ("go", EvidenceType::Claim)]);
        let b = source(EvidenceSource::CodeHosting, &[("python", EvidenceType::CodeEvidence)]);
        let c = source(EvidenceSource::CompetitiveCoding, &[("python", EvidenceType::AlgorithmicProof)]);

        let forward = build(&[a.clone(), b.clone(), c.clone()]);
        let rotated = build(&[c, a, b]);
        assert_eq!(forward, rotated);
    }
}
