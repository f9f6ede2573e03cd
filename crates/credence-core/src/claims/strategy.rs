//! Extraction strategies and the chain that combines them.
//!
//! Strategies are tried in priority order; for each field the first
//! non-empty result is adopted and the strategy that supplied it is recorded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::critic::CapabilityError;

use super::experience::ExperienceEntry;
use super::projects::ProjectEntry;

/// Strategy name of the built-in pattern extractor.
pub const PATTERN_STRATEGY: &str = "pattern";

/// Output schema shared by every strategy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalExtraction {
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
}

impl ExternalExtraction {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience.is_empty() && self.projects.is_empty()
    }
}

/// A field the chain resolves independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimField {
    Skills,
    Experience,
    Projects,
}

/// An extraction capability outside the engine (e.g. a language model).
pub trait ExternalExtractor {
    fn name(&self) -> &str;

    fn extract(&self, text: &str) -> Result<ExternalExtraction, CapabilityError>;
}

/// The default: contributes nothing, so the pattern strategy supplies every
/// field.
#[derive(Debug, Default, Clone)]
pub struct NoExternalExtractor;

impl ExternalExtractor for NoExternalExtractor {
    fn name(&self) -> &str {
        "none"
    }

    fn extract(&self, _text: &str) -> Result<ExternalExtraction, CapabilityError> {
        Ok(ExternalExtraction::default())
    }
}

/// An extraction result obtained elsewhere (e.g. asynchronously).
#[derive(Debug, Clone)]
pub struct PrecomputedExtraction {
    name: String,
    result: Result<ExternalExtraction, CapabilityError>,
}

impl PrecomputedExtraction {
    pub fn new(name: impl Into<String>, result: Result<ExternalExtraction, CapabilityError>) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }
}

impl ExternalExtractor for PrecomputedExtraction {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, _text: &str) -> Result<ExternalExtraction, CapabilityError> {
        self.result.clone()
    }
}

/// Per-field merge of strategy outputs in priority order.
pub fn chain(
    candidates: Vec<(String, ExternalExtraction)>,
) -> (ExternalExtraction, BTreeMap<ClaimField, String>) {
    let mut merged = ExternalExtraction::default();
    let mut provenance = BTreeMap::new();

    for (strategy, output) in candidates {
        if merged.skills.is_empty() && !output.skills.is_empty() {
            merged.skills = output.skills;
            provenance.insert(ClaimField::Skills, strategy.clone());
        }
        if merged.experience.is_empty() && !output.experience.is_empty() {
            merged.experience = output.experience;
            provenance.insert(ClaimField::Experience, strategy.clone());
        }
        if merged.projects.is_empty() && !output.projects.is_empty() {
            merged.projects = output.projects;
            provenance.insert(ClaimField::Projects, strategy);
        }
    }

    (merged, provenance)
}
