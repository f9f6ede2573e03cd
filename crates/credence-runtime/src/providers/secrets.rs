//! API key handling.
//!
//! An [`ApiCredential`] redacts its value in `Debug`. The raw key is only
//! reachable through [`ApiCredential::expose`], called where the request
//! header is set.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Configured,
    Environment,
    Programmatic,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Configured => "configured",
            CredentialSource::Environment => "environment",
            CredentialSource::Programmatic => "programmatic",
        }
    }
}

pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
        }
    }

    /// Use `configured` when present and non-blank, otherwise read `env_var`.
    pub fn resolve(configured: Option<&str>, env_var: &str) -> Result<Self, ProviderError> {
        if let Some(value) = configured.filter(|v| !v.trim().is_empty()) {
            return Ok(Self::new(value, CredentialSource::Configured));
        }

        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Self::new(value, CredentialSource::Environment))
            }
            _ => Err(ProviderError::NotConfigured(format!(
                "no api_key configured and {env_var} is not set"
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "sk-ant-credence-test-0042";

    #[test]
    fn test_debug_redacts_value() {
        let cred = ApiCredential::new(SECRET, CredentialSource::Configured);
        let debug = format!("{:?}", cred);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("configured"));
        assert_eq!(cred.expose(), SECRET);
    }

    #[test]
    fn test_configured_value_wins_over_env() {
        std::env::set_var("CREDENCE_TEST_KEY_PRIORITY", "env-key");

        let cred = ApiCredential::resolve(Some("config-key"), "CREDENCE_TEST_KEY_PRIORITY").unwrap();
        assert_eq!(cred.expose(), "config-key");
        assert_eq!(cred.source(), CredentialSource::Configured);

        let cred = ApiCredential::resolve(Some("  "), "CREDENCE_TEST_KEY_PRIORITY").unwrap();
        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.source(), CredentialSource::Environment);

        std::env::remove_var("CREDENCE_TEST_KEY_PRIORITY");
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let err = ApiCredential::resolve(None, "CREDENCE_TEST_KEY_UNSET_9137")
            .unwrap_err()
            .to_string();
        assert!(err.contains("CREDENCE_TEST_KEY_UNSET_9137"));
    }
}
