//! Normalizing adapter: every input becomes one [`SourceEvidence`].
//!
//! The builder never inspects snapshot shapes; it only sees canonical skill
//! tokens tagged with a source and an evidence type.

use serde::{Deserialize, Serialize};

use crate::claims::{skills, ClaimSet};

use super::sources::{
    CodeHostingSnapshot, CompetitiveSnapshot, EvidenceSource, EvidenceType, ProfessionalSnapshot,
    SourceSnapshots,
};

/// A skill mentioned by a source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillMention {
    pub skill: String,
    pub evidence_type: EvidenceType,
}

/// Canonical shape of one source's contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvidence {
    pub source: EvidenceSource,
    pub mentions: Vec<SkillMention>,
}

impl SourceEvidence {
    fn new(source: EvidenceSource) -> Self {
        Self {
            source,
            mentions: Vec::new(),
        }
    }

    fn add(&mut self, raw: &str, evidence_type: EvidenceType) {
        if let Some(skill) = skills::normalize(raw) {
            self.push(skill, evidence_type);
        }
    }

    fn push(&mut self, skill: String, evidence_type: EvidenceType) {
        let mention = SkillMention {
            skill,
            evidence_type,
        };
        if !self.mentions.contains(&mention) {
            self.mentions.push(mention);
        }
    }
}

/// Self-reported document skills.
pub fn from_claims(claims: &ClaimSet) -> SourceEvidence {
    let mut evidence = SourceEvidence::new(EvidenceSource::Document);
    for skill in &claims.skills {
        evidence.add(skill, EvidenceType::Claim);
    }
    evidence
}

/// Languages of authored repositories are code evidence; bio, topics and
/// detected frameworks are bio evidence.
pub fn from_code_hosting(snapshot: &CodeHostingSnapshot) -> SourceEvidence {
    let mut evidence = SourceEvidence::new(EvidenceSource::CodeHosting);

    for language in &snapshot.verified_languages {
        evidence.add(language, EvidenceType::CodeEvidence);
    }
    for repo in snapshot.repositories.iter().filter(|r| r.is_authored()) {
        for language in &repo.languages {
            evidence.add(language, EvidenceType::CodeEvidence);
        }
    }
    for repo in &snapshot.repositories {
        for item in repo.topics.iter().chain(&repo.frameworks) {
            evidence.add(item, EvidenceType::BioEvidence);
        }
    }
    if let Some(bio) = &snapshot.bio {
        for skill in skills::scan_mentions(bio) {
            evidence.push(skill, EvidenceType::BioEvidence);
        }
    }

    evidence
}

/// Competitive-programming languages and problem topics are algorithmic proof.
pub fn from_competitive(snapshot: &CompetitiveSnapshot) -> SourceEvidence {
    let mut evidence = SourceEvidence::new(EvidenceSource::CompetitiveCoding);
    for item in snapshot.languages.iter().chain(&snapshot.topics) {
        evidence.add(item, EvidenceType::AlgorithmicProof);
    }
    evidence
}

/// Professional-network skills and headline are self-reported.
pub fn from_professional(snapshot: &ProfessionalSnapshot) -> SourceEvidence {
    let mut evidence = SourceEvidence::new(EvidenceSource::ProfessionalNetwork);
    for skill in &snapshot.claimed_skills {
        evidence.add(skill, EvidenceType::Claim);
    }
    if let Some(headline) = &snapshot.headline {
        for skill in skills::scan_mentions(headline) {
            evidence.push(skill, EvidenceType::Claim);
        }
    }
    evidence
}

/// Normalize the document claims and every present snapshot.
pub fn normalize(claims: &ClaimSet, snapshots: &SourceSnapshots) -> Vec<SourceEvidence> {
    let mut inputs = vec![from_claims(claims)];
    if let Some(s) = &snapshots.code_hosting {
        inputs.push(from_code_hosting(s));
    }
    if let Some(s) = &snapshots.competitive_coding {
        inputs.push(from_competitive(s));
    }
    if let Some(s) = &snapshots.professional_network {
        inputs.push(from_professional(s));
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sources::Repository;

    #[test]
    fn test_forked_repo_languages_are_not_code_evidence() {
        let snapshot = CodeHostingSnapshot {
            credibility_score: 70.0,
            verified_languages: vec![],
            repositories: vec![
                Repository {
                    name: "mine".into(),
                    owned: true,
                    languages: vec!["Rust".into()],
                    frameworks: vec!["Tokio".into()],
                    ..Repository::default()
                },
                Repository {
                    name: "fork".into(),
                    owned: true,
                    fork: true,
                    languages: vec!["Haskell".into()],
                    ..Repository::default()
                },
            ],
            bio: Some("Building with React.js".into()),
        };

        let evidence = from_code_hosting(&snapshot);
        let has = |skill: &str, t: EvidenceType| {
            evidence.mentions.iter().any(|m| m.skill == skill && m.evidence_type == t)
        };
        assert!(has("rust", EvidenceType::CodeEvidence));
        assert!(has("tokio", EvidenceType::BioEvidence));
        assert!(has("react", EvidenceType::BioEvidence));
        assert!(!evidence.mentions.iter().any(|m| m.skill == "haskell"));
    }

    #[test]
    fn test_competitive_topics_normalized() {
        let evidence = from_competitive(&CompetitiveSnapshot {
            problems_solved: 300,
            rating: Some(1900.0),
            languages: vec!["C++17".into()],
            topics: vec!["Dynamic Programming".into(), "graphs".into()],
        });
        let skills: Vec<&str> = evidence.mentions.iter().map(|m| m.skill.as_str()).collect();
        assert_eq!(skills, vec!["c++", "dynamic-programming", "graph-algorithms"]);
    }

    #[test]
    fn test_normalize_skips_absent_sources() {
        let inputs = normalize(&ClaimSet::default(), &SourceSnapshots::default());
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].source, EvidenceSource::Document);
    }
}
