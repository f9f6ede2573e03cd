//! Policy parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_policy_schema;

/// Errors that can occur when loading a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read policy file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Policy does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Policy validation failed: {0}")]
    ValidationError(String),
}

/// Thresholds of the invisible-content detector.
///
/// Severity is decided top-down, so the critical bounds must dominate the
/// high bounds, which must dominate the medium bound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InvisiblePolicy {
    /// Suspicious hidden matches that trigger critical (inclusive)
    pub critical_matches: usize,
    /// Hidden word count that triggers critical (exclusive)
    pub critical_hidden_words: usize,
    pub high_matches: usize,
    pub high_hidden_words: usize,
    pub medium_hidden_words: usize,
    /// Added to the built-in suspicious keyword list
    pub extra_suspicious_keywords: Vec<String>,
}

impl Default for InvisiblePolicy {
    fn default() -> Self {
        Self {
            critical_matches: 5,
            critical_hidden_words: 100,
            high_matches: 2,
            high_hidden_words: 50,
            medium_hidden_words: 20,
            extra_suspicious_keywords: Vec::new(),
        }
    }
}

/// Thresholds of the pattern injection scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InjectionPolicy {
    /// Total matches that escalate to critical even without a critical pattern
    pub critical_match_count: usize,
    pub high_match_count: usize,
    /// Matched substrings kept for audit
    pub max_evidence: usize,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        Self {
            critical_match_count: 3,
            high_match_count: 2,
            max_evidence: 5,
        }
    }
}

/// How critic verdicts map onto severities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CriticPolicy {
    pub high_confidence: f64,
    pub medium_confidence: f64,
}

impl Default for CriticPolicy {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            medium_confidence: 0.5,
        }
    }
}

/// Integrity section of a policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct IntegrityPolicy {
    pub invisible: InvisiblePolicy,
    pub injection: InjectionPolicy,
    pub critic: CriticPolicy,
}

/// Segmentation parameters of the claim extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClaimsPolicy {
    /// A section must exceed this many chars to count as content
    pub min_section_chars: usize,
    /// Window size for the full-text fallback split
    pub window_chars: usize,
    /// Header lines have at most this many words
    pub max_header_words: usize,
    /// Header lines have at most this many chars
    pub max_header_chars: usize,
}

impl Default for ClaimsPolicy {
    fn default() -> Self {
        Self {
            min_section_chars: 40,
            window_chars: 1500,
            max_header_words: 5,
            max_header_chars: 40,
        }
    }
}

/// Fixed trust weight of every evidence source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceWeights {
    pub document: f64,
    pub code_hosting: f64,
    pub competitive_coding: f64,
    pub professional_network: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            document: 0.15,
            code_hosting: 0.40,
            competitive_coding: 0.25,
            professional_network: 0.20,
        }
    }
}

impl SourceWeights {
    /// Sum of the canonical weight set. Skill confidence divides by this.
    pub fn total(&self) -> f64 {
        self.document + self.code_hosting + self.competitive_coding + self.professional_network
    }
}

/// Evidence graph section of a policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphPolicy {
    pub weights: SourceWeights,
    /// Skills below this confidence are listed as weak signals
    pub min_confidence: f64,
    /// Derived skill confidence = parent confidence * decay
    pub ontology_decay: f64,
}

impl Default for GraphPolicy {
    fn default() -> Self {
        Self {
            weights: SourceWeights::default(),
            min_confidence: 0.3,
            ontology_decay: 0.8,
        }
    }
}

/// Relative weight of each sub-score in the portfolio score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortfolioWeights {
    pub code_hosting: f64,
    pub competitive_coding: f64,
    pub narrative: f64,
    pub professional_network: f64,
}

impl Default for PortfolioWeights {
    fn default() -> Self {
        Self {
            code_hosting: 0.35,
            competitive_coding: 0.25,
            narrative: 0.20,
            professional_network: 0.20,
        }
    }
}

/// Decision section of a policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionPolicy {
    pub weights: PortfolioWeights,
    /// Confidence at or above this is a strong signal
    pub strong_threshold: f64,
    /// Confidence at or above this (and below strong) is a weak signal
    pub weak_threshold: f64,
    /// Multiplier applied when any manipulation signal was found
    pub manipulation_penalty: f64,
    /// Multiplier applied once per conflict flag
    pub conflict_penalty: f64,
    /// Lower bound of the combined conflict multiplier
    pub conflict_penalty_floor: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            weights: PortfolioWeights::default(),
            strong_threshold: 70.0,
            weak_threshold: 40.0,
            manipulation_penalty: 0.5,
            conflict_penalty: 0.95,
            conflict_penalty_floor: 0.8,
        }
    }
}

/// A trust policy: every tunable of the engine in one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    /// Version of this policy document
    pub policy_version: String,

    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub integrity: IntegrityPolicy,

    #[serde(default)]
    pub claims: ClaimsPolicy,

    #[serde(default)]
    pub graph: GraphPolicy,

    #[serde(default)]
    pub decision: DecisionPolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            policy_version: "1.0".to_string(),
            name: "default".to_string(),
            description: Some("Built-in evidence trust policy".to_string()),
            integrity: IntegrityPolicy::default(),
            claims: ClaimsPolicy::default(),
            graph: GraphPolicy::default(),
            decision: DecisionPolicy::default(),
        }
    }
}

impl Policy {
    /// Parse a policy from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a policy from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a policy from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a policy from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load a policy file, choosing the format from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, PolicyError> {
        validate_policy_schema(&value).map_err(PolicyError::SchemaError)?;
        let policy: Policy = serde_json::from_value(value)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Semantic checks the schema cannot express.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::ValidationError("name must not be empty".to_string()));
        }

        self.validate_invisible()?;
        self.validate_injection()?;
        self.validate_graph()?;
        self.validate_decision()?;

        Ok(())
    }

    fn validate_invisible(&self) -> Result<(), PolicyError> {
        let inv = &self.integrity.invisible;

        if inv.high_matches == 0 || inv.critical_matches < inv.high_matches {
            return Err(PolicyError::ValidationError(format!(
                "integrity.invisible: critical_matches ({}) must be >= high_matches ({}) >= 1",
                inv.critical_matches, inv.high_matches
            )));
        }

        if !(inv.critical_hidden_words >= inv.high_hidden_words
            && inv.high_hidden_words >= inv.medium_hidden_words)
        {
            return Err(PolicyError::ValidationError(format!(
                "integrity.invisible: hidden word thresholds must be monotonic ({} >= {} >= {})",
                inv.critical_hidden_words, inv.high_hidden_words, inv.medium_hidden_words
            )));
        }

        Ok(())
    }

    fn validate_injection(&self) -> Result<(), PolicyError> {
        let inj = &self.integrity.injection;
        if inj.high_match_count < 2 || inj.critical_match_count < inj.high_match_count {
            return Err(PolicyError::ValidationError(format!(
                "integrity.injection: critical_match_count ({}) must be >= high_match_count ({}) >= 2",
                inj.critical_match_count, inj.high_match_count
            )));
        }

        let critic = &self.integrity.critic;
        if critic.medium_confidence > critic.high_confidence {
            return Err(PolicyError::ValidationError(
                "integrity.critic: medium_confidence must not exceed high_confidence".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_graph(&self) -> Result<(), PolicyError> {
        let w = &self.graph.weights;
        let all = [w.document, w.code_hosting, w.competitive_coding, w.professional_network];
        if all.iter().any(|x| !(0.0..=1.0).contains(x)) || w.total() <= 0.0 {
            return Err(PolicyError::ValidationError(
                "graph.weights: every weight must be in [0, 1] and their sum positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.graph.ontology_decay) {
            return Err(PolicyError::ValidationError(
                "graph.ontology_decay must be in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_decision(&self) -> Result<(), PolicyError> {
        let d = &self.decision;

        if !(d.weak_threshold < d.strong_threshold && d.strong_threshold <= 100.0 && d.weak_threshold >= 0.0) {
            return Err(PolicyError::ValidationError(format!(
                "decision: thresholds must satisfy 0 <= weak ({}) < strong ({}) <= 100",
                d.weak_threshold, d.strong_threshold
            )));
        }

        let pw = &d.weights;
        let portfolio = [pw.code_hosting, pw.competitive_coding, pw.narrative, pw.professional_network];
        if portfolio.iter().any(|x| !(*x >= 0.0)) || portfolio.iter().sum::<f64>() <= 0.0 {
            return Err(PolicyError::ValidationError(
                "decision.weights must not be negative and their sum must be positive".to_string(),
            ));
        }

        for (name, value) in [
            ("manipulation_penalty", d.manipulation_penalty),
            ("conflict_penalty", d.conflict_penalty),
            ("conflict_penalty_floor", d.conflict_penalty_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::ValidationError(format!(
                    "decision.{} must be in [0, 1]",
                    name
                )));
            }
        }

        Ok(())
    }
}
