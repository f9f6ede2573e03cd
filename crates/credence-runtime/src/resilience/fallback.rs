//! Fallback strategies when a capability fails.

use serde::{Deserialize, Serialize};

/// What the orchestrator does when the critic or extractor times out,
/// errors, returns invalid output or has an open circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Continue with the core's deterministic behavior: the critic counts as
    /// unavailable, claims come from pattern extraction. The failure is
    /// recorded as a degradation.
    #[default]
    Deterministic,

    /// Abort the evaluation with an error
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_representation() {
        assert_eq!(
            serde_json::to_string(&FallbackStrategy::Deterministic).unwrap(),
            r#"{"type":"deterministic"}"#
        );
        let strategy: FallbackStrategy = serde_json::from_str(r#"{"type":"fail"}"#).unwrap();
        assert_eq!(strategy, FallbackStrategy::Fail);
    }
}
