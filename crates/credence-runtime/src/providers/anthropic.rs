//! Anthropic Messages API backend (`anthropic` feature).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    secrets::{ApiCredential, CredentialSource},
    Completion, CompletionConfig, LlmProvider, Prompt, ProviderError, TokenUsage,
};

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Connection settings. The key falls back to `ANTHROPIC_API_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

pub struct AnthropicProvider {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(api_key, CredentialSource::Programmatic))
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_config(&AnthropicConfig::default())
    }

    pub fn from_config(config: &AnthropicConfig) -> Result<Self, ProviderError> {
        let credential = ApiCredential::resolve(config.api_key.as_deref(), ANTHROPIC_API_KEY_ENV)?;
        let mut provider = Self::with_credential(credential);

        if let Some(url) = &config.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(format!(
                    "base_url must be an http(s) URL, got '{url}'"
                )));
            }
            provider.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(provider)
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: Vec<TextBlock<'a>>,
    messages: [UserTurn<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> TextBlock<'a> {
    fn new(text: &'a str, cached: bool) -> Self {
        Self {
            kind: "text",
            text,
            cache_control: cached.then_some(CacheControl { kind: "ephemeral" }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    model: String,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    cache_read_input_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The document turn is never cached; it differs on every call.
fn build_request<'a>(prompt: &'a Prompt, config: &'a CompletionConfig) -> MessagesRequest<'a> {
    MessagesRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        system: vec![TextBlock::new(prompt.instructions, config.cache_instructions)],
        messages: [UserTurn {
            role: "user",
            content: vec![TextBlock::new(&prompt.document, false)],
        }],
        temperature: (config.temperature != 0.0).then_some(config.temperature),
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<Completion, ProviderError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", API_VERSION)
            .timeout(config.timeout)
            .json(&build_request(prompt, config))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(ProviderError::Unauthorized),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                return Err(ProviderError::RateLimited { retry_after });
            }
            _ if !status.is_success() => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .map(|b| b.error.message)
                    .unwrap_or_else(|_| status.to_string());
                return Err(ProviderError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(Completion {
            text: body.content.into_iter().filter_map(|b| b.text).collect(),
            model: body.model,
            usage: TokenUsage {
                input_tokens: body.usage.input_tokens,
                output_tokens: body.usage.output_tokens,
                cached_input_tokens: body.usage.cache_read_input_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-ant-credence-secret-777";
        let debug = format!("{:?}", AnthropicProvider::new(secret));
        assert!(!debug.contains(secret));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_config_normalizes_base_url() {
        let provider = AnthropicProvider::from_config(&AnthropicConfig {
            api_key: Some("config-key".into()),
            base_url: Some("https://proxy.internal/v1/".into()),
        })
        .unwrap();
        assert_eq!(provider.base_url, "https://proxy.internal/v1");
        assert_eq!(provider.credential.source(), CredentialSource::Configured);

        let err = AnthropicProvider::from_config(&AnthropicConfig {
            api_key: Some("k".into()),
            base_url: Some("proxy".into()),
        })
        .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_request_caches_only_instructions() {
        let prompt = Prompt::new("rules", "Jane Doe");
        let config = CompletionConfig::default();
        let json = serde_json::to_value(build_request(&prompt, &config)).unwrap();

        assert_eq!(json["system"][0]["text"], "rules");
        assert_eq!(json["system"][0]["cache_control"]["type"], "ephemeral");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json["messages"][0]["content"][0].get("cache_control").is_none());
        assert!(json.get("temperature").is_none());
    }
}
