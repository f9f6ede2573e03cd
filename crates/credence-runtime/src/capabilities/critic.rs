//! LLM-backed adversarial critic.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use credence_core::{CriticVerdict, LayeredText};

use super::{AgentError, CriticAgent};
use crate::prompts::{self, CRITIC_SYSTEM_PROMPT};
use crate::providers::{CompletionConfig, LlmProvider, Prompt};

/// Critic that asks a model whether the document targets its evaluator.
pub struct LlmCritic {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

#[derive(Debug, Deserialize)]
struct CriticReply {
    suspicious: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reason: String,
}

impl LlmCritic {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self { provider, completion }
    }
}

/// Parse the model's reply into a verdict.
pub(crate) fn parse_verdict(reply: &str) -> Result<CriticVerdict, AgentError> {
    let json = prompts::json_object(reply)
        .ok_or_else(|| AgentError::InvalidOutput("no JSON object in critic reply".to_string()))?;
    let reply: CriticReply =
        serde_json::from_str(json).map_err(|e| AgentError::InvalidOutput(e.to_string()))?;

    if !(0.0..=1.0).contains(&reply.confidence) {
        return Err(AgentError::InvalidOutput(format!(
            "confidence {} outside [0, 1]",
            reply.confidence
        )));
    }

    Ok(if reply.suspicious {
        CriticVerdict::Suspicious {
            confidence: reply.confidence,
            reason: reply.reason,
        }
    } else {
        CriticVerdict::Safe
    })
}

#[async_trait]
impl CriticAgent for LlmCritic {
    fn name(&self) -> &str {
        "llm_critic"
    }

    async fn review(&self, layers: &LayeredText) -> Result<CriticVerdict, AgentError> {
        // the full view, so hidden text is visible to the critic
        let prompt = Prompt::new(CRITIC_SYSTEM_PROMPT, &layers.full_text);

        let response = self.provider.complete(&prompt, &self.completion).await?;
        tracing::debug!(
            provider = self.provider.name(),
            tokens = response.usage.total(),
            "Critic replied"
        );
        parse_verdict(&response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suspicious_reply() {
        let verdict = parse_verdict(
            "```json\n{\"suspicious\": true, \"confidence\": 0.85, \"reason\": \"asks the grader for a perfect score\"}\n```",
        )
        .unwrap();
        assert_eq!(
            verdict,
            CriticVerdict::Suspicious {
                confidence: 0.85,
                reason: "asks the grader for a perfect score".into()
            }
        );
    }

    #[test]
    fn test_parse_safe_reply() {
        assert_eq!(
            parse_verdict(r#"{"suspicious": false, "confidence": 0.1, "reason": ""}"#).unwrap(),
            CriticVerdict::Safe
        );
    }

    #[test]
    fn test_malformed_replies_rejected() {
        assert!(parse_verdict("Looks fine to me.").is_err());
        assert!(parse_verdict(r#"{"confidence": 0.4}"#).is_err());
        assert!(parse_verdict(r#"{"suspicious": true, "confidence": 4.0}"#).is_err());
    }
}
