//! Evidence sources and the snapshots external collaborators supply.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::SourceWeights;

/// A named, independent channel of evidence about a candidate.
///
/// Variant order is the canonical merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Document,
    CodeHosting,
    CompetitiveCoding,
    ProfessionalNetwork,
}

impl EvidenceSource {
    pub const ALL: [EvidenceSource; 4] = [
        EvidenceSource::Document,
        EvidenceSource::CodeHosting,
        EvidenceSource::CompetitiveCoding,
        EvidenceSource::ProfessionalNetwork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::Document => "document",
            EvidenceSource::CodeHosting => "code_hosting",
            EvidenceSource::CompetitiveCoding => "competitive_coding",
            EvidenceSource::ProfessionalNetwork => "professional_network",
        }
    }

    /// Fixed trust weight of this source under `weights`.
    pub fn weight(&self, weights: &SourceWeights) -> f64 {
        match self {
            EvidenceSource::Document => weights.document,
            EvidenceSource::CodeHosting => weights.code_hosting,
            EvidenceSource::CompetitiveCoding => weights.competitive_coding,
            EvidenceSource::ProfessionalNetwork => weights.professional_network,
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a source supports a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Language detected in code the candidate owns
    CodeEvidence,
    /// Bio, repository topics, detected frameworks or imports
    BioEvidence,
    /// Solved competitive-programming problems
    AlgorithmicProof,
    /// Self-reported
    Claim,
}

impl EvidenceType {
    /// Whether this type corroborates a claim independently of the candidate's
    /// own statement.
    pub fn corroborates(&self) -> bool {
        !matches!(self, EvidenceType::Claim)
    }
}

/// One repository of a code-hosting profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    /// 0-100
    pub quality_score: f64,
    pub owned: bool,
    pub fork: bool,
    pub languages: Vec<String>,
    pub topics: Vec<String>,
    /// Frameworks detected from manifests or imports
    pub frameworks: Vec<String>,
}

impl Repository {
    /// Code the candidate wrote: owned and not a fork.
    pub fn is_authored(&self) -> bool {
        self.owned && !self.fork
    }
}

/// Pre-normalized code-hosting signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeHostingSnapshot {
    /// 0-100
    pub credibility_score: f64,
    pub verified_languages: Vec<String>,
    pub repositories: Vec<Repository>,
    pub bio: Option<String>,
}

/// Pre-normalized competitive-programming signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitiveSnapshot {
    pub problems_solved: u32,
    pub rating: Option<f64>,
    pub languages: Vec<String>,
    /// Problem tags, e.g. "dynamic programming"
    pub topics: Vec<String>,
}

/// One position on a professional-network profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub title: String,
    pub organization: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Pre-normalized professional-network signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionalSnapshot {
    pub claimed_skills: Vec<String>,
    pub timeline: Vec<TimelineEntry>,
    pub headline: Option<String>,
}

/// Every optional external snapshot for one evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSnapshots {
    pub code_hosting: Option<CodeHostingSnapshot>,
    pub competitive_coding: Option<CompetitiveSnapshot>,
    pub professional_network: Option<ProfessionalSnapshot>,
}

impl SourceSnapshots {
    /// External sources with a snapshot, in canonical order.
    pub fn present(&self) -> Vec<EvidenceSource> {
        let mut present = Vec::new();
        if self.code_hosting.is_some() {
            present.push(EvidenceSource::CodeHosting);
        }
        if self.competitive_coding.is_some() {
            present.push(EvidenceSource::CompetitiveCoding);
        }
        if self.professional_network.is_some() {
            present.push(EvidenceSource::ProfessionalNetwork);
        }
        present
    }
}
