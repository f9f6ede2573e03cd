//! LLM-backed claim extractor.

use async_trait::async_trait;
use std::sync::Arc;

use credence_core::ExternalExtraction;

use super::{AgentError, ExtractionAgent, ExtractionValidator};
use crate::prompts::{self, EXTRACTOR_SYSTEM_PROMPT};
use crate::providers::{CompletionConfig, LlmProvider, Prompt};

/// Extractor whose output must pass [`ExtractionValidator`].
pub struct LlmExtractor {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl LlmExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self { provider, completion }
    }
}

/// Parse and ground the model's reply against `text`.
pub(crate) fn parse_extraction(reply: &str, text: &str) -> Result<ExternalExtraction, AgentError> {
    let json = prompts::json_object(reply)
        .ok_or_else(|| AgentError::InvalidOutput("no JSON object in extractor reply".to_string()))?;
    let extraction: ExternalExtraction =
        serde_json::from_str(json).map_err(|e| AgentError::InvalidOutput(e.to_string()))?;

    ExtractionValidator::new(text).validate(&extraction)?;
    Ok(extraction)
}

#[async_trait]
impl ExtractionAgent for LlmExtractor {
    fn name(&self) -> &str {
        "llm_extractor"
    }

    async fn extract(&self, text: &str) -> Result<ExternalExtraction, AgentError> {
        let prompt = Prompt::new(EXTRACTOR_SYSTEM_PROMPT, text);

        let response = self.provider.complete(&prompt, &self.completion).await?;
        let extraction = parse_extraction(&response.text, text)?;
        tracing::debug!(
            skills = extraction.skills.len(),
            experience = extraction.experience.len(),
            projects = extraction.projects.len(),
            "Extraction accepted"
        );
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Staff Engineer, Initech (2019 - 2023)\nSkills: Go, Terraform";

    #[test]
    fn test_grounded_reply_parsed() {
        let reply = r#"Here you go:
{"skills": ["Go", "Terraform"],
 "experience": [{"title": "Staff Engineer", "company": "Initech", "timeframe": "2019 - 2023"}]}"#;
        let extraction = parse_extraction(reply, TEXT).unwrap();
        assert_eq!(extraction.skills, vec!["Go", "Terraform"]);
        assert_eq!(extraction.experience[0].timeframe.as_deref(), Some("2019 - 2023"));
        assert!(extraction.experience[0].responsibilities.is_empty());
        assert!(extraction.projects.is_empty());
    }

    #[test]
    fn test_hallucinated_reply_rejected() {
        let reply = r#"{"experience": [{"title": "CTO", "company": "Hooli"}]}"#;
        assert!(matches!(
            parse_extraction(reply, TEXT),
            Err(AgentError::Ungrounded(_))
        ));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(matches!(
            parse_extraction(r#"{"skills": "Go"}"#, TEXT),
            Err(AgentError::InvalidOutput(_))
        ));
    }
}
