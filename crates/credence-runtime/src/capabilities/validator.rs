//! Grounding checks for model-extracted claims.
//!
//! A model produces candidate claims, not facts. Every experience entry,
//! project and skill it returns must be traceable to the document text; if
//! any is not, the whole extraction is rejected and the core falls back to
//! pattern extraction. There is no partial acceptance.

use credence_core::claims::ExternalExtraction;
use thiserror::Error;

/// Why an extraction was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionValidationError {
    #[error("experience entry has neither title nor company")]
    EmptyExperience,

    #[error("experience entry '{title}' at '{company}' does not occur in the document")]
    UngroundedExperience { title: String, company: String },

    #[error("project '{name}' does not occur in the document")]
    UngroundedProject { name: String },

    #[error("skill '{skill}' does not occur in the document")]
    UngroundedSkill { skill: String },
}

/// Checks extracted claims against the text they were extracted from.
pub struct ExtractionValidator {
    haystack: String,
}

impl ExtractionValidator {
    pub fn new(text: &str) -> Self {
        Self {
            haystack: fold(text),
        }
    }

    pub fn validate(&self, extraction: &ExternalExtraction) -> Result<(), ExtractionValidationError> {
        for entry in &extraction.experience {
            let title = entry.title.trim();
            let company = entry.company.trim();
            if title.is_empty() && company.is_empty() {
                return Err(ExtractionValidationError::EmptyExperience);
            }
            // title OR company
            if !self.occurs(title) && !self.occurs(company) {
                return Err(ExtractionValidationError::UngroundedExperience {
                    title: title.to_string(),
                    company: company.to_string(),
                });
            }
        }

        for project in &extraction.projects {
            if !self.occurs(&project.name) {
                return Err(ExtractionValidationError::UngroundedProject {
                    name: project.name.clone(),
                });
            }
        }

        for skill in &extraction.skills {
            if !self.occurs(skill) {
                return Err(ExtractionValidationError::UngroundedSkill { skill: skill.clone() });
            }
        }

        Ok(())
    }

    fn occurs(&self, needle: &str) -> bool {
        let needle = fold(needle);
        !needle.is_empty() && self.haystack.contains(&needle)
    }
}

/// Lowercase with whitespace runs collapsed to one space.
fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_core::claims::{ExperienceEntry, ProjectEntry};

    const TEXT: &str = "Experience\nSenior   Engineer at Acme Payments (2020 - Present)\n\
        Projects\nLedgerline: double-entry ledger\nSkills\nRust, PostgreSQL";

    fn experience(title: &str, company: &str) -> ExternalExtraction {
        ExternalExtraction {
            experience: vec![ExperienceEntry {
                title: title.into(),
                company: company.into(),
                ..ExperienceEntry::default()
            }],
            ..ExternalExtraction::default()
        }
    }

    #[test]
    fn test_grounded_extraction_passes() {
        let extraction = ExternalExtraction {
            skills: vec!["Rust".into(), "postgresql".into()],
            experience: experience("Senior Engineer", "Acme Payments").experience,
            projects: vec![ProjectEntry {
                name: "Ledgerline".into(),
                ..ProjectEntry::default()
            }],
        };
        assert!(ExtractionValidator::new(TEXT).validate(&extraction).is_ok());
    }

    #[test]
    fn test_title_or_company_suffices() {
        let validator = ExtractionValidator::new(TEXT);
        assert!(validator.validate(&experience("Staff Engineer", "Acme Payments")).is_ok());
        assert!(validator.validate(&experience("Senior Engineer", "Acme Corp")).is_ok());
    }

    #[test]
    fn test_invented_entries_rejected() {
        let validator = ExtractionValidator::new(TEXT);
        assert!(matches!(
            validator.validate(&experience("Principal Architect", "Globex")),
            Err(ExtractionValidationError::UngroundedExperience { .. })
        ));
        assert_eq!(
            validator.validate(&experience("  ", "")),
            Err(ExtractionValidationError::EmptyExperience)
        );

        let skills = ExternalExtraction {
            skills: vec!["Rust".into(), "Kubernetes".into()],
            ..ExternalExtraction::default()
        };
        assert_eq!(
            validator.validate(&skills),
            Err(ExtractionValidationError::UngroundedSkill {
                skill: "Kubernetes".into()
            })
        );
    }

    #[test]
    fn test_empty_extraction_is_valid() {
        assert!(ExtractionValidator::new("").validate(&ExternalExtraction::default()).is_ok());
    }
}
