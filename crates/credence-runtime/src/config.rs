//! Runtime configuration.
//!
//! Durations are written as humantime strings ("5s", "250ms", "1m 30s").

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capabilities::Capability;
use crate::providers::CompletionConfig;
use crate::resilience::{CircuitBreakerConfig, FallbackStrategy};

/// Configuration for the runtime orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound on one critic review
    #[serde(with = "duration")]
    pub critic_timeout: Duration,

    /// Upper bound on one external extraction
    #[serde(with = "duration")]
    pub extractor_timeout: Duration,

    /// Upper bound on each source fetch attempt
    #[serde(with = "duration")]
    pub source_timeout: Duration,

    /// Retries after the first failed fetch attempt
    pub source_retries: usize,

    /// Initial backoff between fetch attempts
    #[serde(with = "duration")]
    pub retry_delay: Duration,

    pub circuit_breaker: CircuitBreakerConfig,

    /// Settings passed to the LLM provider
    pub completion: CompletionConfig,

    /// What to do when a capability fails
    pub fallback: FallbackStrategy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            critic_timeout: Duration::from_secs(10),
            extractor_timeout: Duration::from_secs(20),
            source_timeout: Duration::from_secs(5),
            source_retries: 2,
            retry_delay: Duration::from_millis(200),
            circuit_breaker: CircuitBreakerConfig::default(),
            completion: CompletionConfig::default(),
            fallback: FallbackStrategy::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Timeout applied to one call of `capability`.
    pub fn timeout(&self, capability: Capability) -> Duration {
        match capability {
            Capability::Critic => self.critic_timeout,
            Capability::Extractor => self.extractor_timeout,
        }
    }
}

/// Serde adapter for humantime durations.
pub(crate) mod duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.timeout(Capability::Critic), Duration::from_secs(10));
        assert_eq!(config.source_retries, 2);
        assert!(matches!(config.fallback, FallbackStrategy::Deterministic));
    }

    #[test]
    fn test_humantime_durations() {
        let config = RuntimeConfig::from_json(
            r#"{
                "critic_timeout": "2s",
                "retry_delay": "150ms",
                "circuit_breaker": { "recovery_timeout": "1m" },
                "fallback": { "type": "fail" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.critic_timeout, Duration::from_secs(2));
        assert_eq!(config.retry_delay, Duration::from_millis(150));
        assert_eq!(config.circuit_breaker.recovery_timeout, Duration::from_secs(60));
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.extractor_timeout, Duration::from_secs(20));
        assert!(matches!(config.fallback, FallbackStrategy::Fail));
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(RuntimeConfig::from_json(r#"{"source_timeout": "soon"}"#).is_err());
    }

    #[test]
    fn test_roundtrip_keeps_durations() {
        let json = serde_json::to_string(&RuntimeConfig::default()).unwrap();
        assert!(json.contains("\"200ms\""));
        let back = RuntimeConfig::from_json(&json).unwrap();
        assert_eq!(back.retry_delay, Duration::from_millis(200));
    }
}
