//! Deterministic per-source sub-scores, each on a 0-100 scale.
//!
//! A source without a snapshot has no sub-score; its portfolio weight is
//! redistributed over the sources that are present.

use serde::{Deserialize, Serialize};

use crate::claims::ClaimSet;
use crate::graph::{CodeHostingSnapshot, CompetitiveSnapshot, ProfessionalSnapshot, SourceSnapshots};
use crate::policy::PortfolioWeights;

/// Problems solved at which the volume part saturates.
const SOLVED_SATURATION: f64 = 500.0;
/// Rating band mapped onto the rating part.
const RATING_FLOOR: f64 = 800.0;
const RATING_CEILING: f64 = 2400.0;

/// One optional sub-score per portfolio component. `None` means absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubScores {
    pub code_hosting: Option<f64>,
    pub competitive_coding: Option<f64>,
    pub narrative: Option<f64>,
    pub professional_network: Option<f64>,
}

impl SubScores {
    /// Compute every sub-score that has an input. Values in `overrides` win.
    pub fn compute(claims: &ClaimSet, snapshots: &SourceSnapshots, overrides: &SubScores) -> Self {
        Self {
            code_hosting: overrides
                .code_hosting
                .or_else(|| snapshots.code_hosting.as_ref().map(code_hosting)),
            competitive_coding: overrides
                .competitive_coding
                .or_else(|| snapshots.competitive_coding.as_ref().map(competitive)),
            narrative: overrides.narrative.or(Some(narrative(claims))),
            professional_network: overrides
                .professional_network
                .or_else(|| snapshots.professional_network.as_ref().map(professional)),
        }
    }

    /// Weighted mean over present components, weights renormalized.
    pub fn portfolio(&self, weights: &PortfolioWeights) -> f64 {
        let parts = [
            (self.code_hosting, weights.code_hosting),
            (self.competitive_coding, weights.competitive_coding),
            (self.narrative, weights.narrative),
            (self.professional_network, weights.professional_network),
        ];

        let (weighted, total) = parts
            .iter()
            .filter_map(|(score, weight)| score.map(|s| (s.clamp(0.0, 100.0), *weight)))
            .fold((0.0, 0.0), |(acc, tw), (s, w)| (acc + s * w, tw + w));

        if total <= 0.0 {
            0.0
        } else {
            weighted / total
        }
    }
}

/// Credibility blended with the mean quality of authored repositories.
pub fn code_hosting(snapshot: &CodeHostingSnapshot) -> f64 {
    let credibility = snapshot.credibility_score.clamp(0.0, 100.0);
    let authored: Vec<f64> = snapshot
        .repositories
        .iter()
        .filter(|r| r.is_authored())
        .map(|r| r.quality_score.clamp(0.0, 100.0))
        .collect();

    if authored.is_empty() {
        return credibility;
    }
    let quality = authored.iter().sum::<f64>() / authored.len() as f64;
    credibility * 0.7 + quality * 0.3
}

/// Half volume of solved problems, half rating.
pub fn competitive(snapshot: &CompetitiveSnapshot) -> f64 {
    let volume = (f64::from(snapshot.problems_solved) / SOLVED_SATURATION).min(1.0) * 50.0;
    let rating = snapshot
        .rating
        .map(|r| ((r - RATING_FLOOR) / (RATING_CEILING - RATING_FLOOR)).clamp(0.0, 1.0) * 50.0)
        .unwrap_or(0.0);
    volume + rating
}

/// Richness of the document's own claims.
pub fn narrative(claims: &ClaimSet) -> f64 {
    let experience: f64 = claims.experience.iter().map(|e| e.completeness() * 20.0).sum();
    let projects = claims.projects.len() as f64 * 10.0;
    let skills = claims.skills.len() as f64 * 2.0;
    experience.min(50.0) + projects.min(30.0) + skills.min(20.0)
}

/// Profile completeness.
pub fn professional(snapshot: &ProfessionalSnapshot) -> f64 {
    let mut score = 0.0;
    if !snapshot.claimed_skills.is_empty() {
        score += 30.0;
    }
    if !snapshot.timeline.is_empty() {
        score += 40.0;
    }
    if snapshot.headline.as_deref().is_some_and(|h| !h.trim().is_empty()) {
        score += 30.0;
    }
    score
}
