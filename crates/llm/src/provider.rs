//! Provider registry: one configured client per upstream LLM vendor.

use std::str::FromStr;

use tazeai_core::Config;

use crate::client::LlmClient;
use crate::error::LlmError;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";
const DEEPSEEK_DEFAULT_URL: &str = "https://api.deepseek.com";

/// Upstream LLM vendors the gateway can relay to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    DeepSeek,
}

impl ProviderType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
        }
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            _ => Err(LlmError::ModelNotFound),
        }
    }
}

/// Holds the clients for every provider that has an API key configured.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    openai: Option<LlmClient>,
    deepseek: Option<LlmClient>,
}

impl ProviderRegistry {
    /// Build the registry from process configuration. Providers without an
    /// API key are simply absent — asking for them later yields
    /// [`LlmError::ModelNotFound`].
    ///
    /// # Errors
    /// Returns an error if a configured client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let openai = config
            .openai
            .as_ref()
            .map(|p| {
                LlmClient::new(
                    p.api_key.clone(),
                    p.base_url.clone().unwrap_or_else(|| OPENAI_DEFAULT_URL.to_owned()),
                )
            })
            .transpose()?;
        let deepseek = config
            .deepseek
            .as_ref()
            .map(|p| {
                LlmClient::new(
                    p.api_key.clone(),
                    p.base_url.clone().unwrap_or_else(|| DEEPSEEK_DEFAULT_URL.to_owned()),
                )
            })
            .transpose()?;
        Ok(Self { openai, deepseek })
    }

    /// An empty registry (no providers). Useful in tests.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, provider: ProviderType) -> Option<&LlmClient> {
        match provider {
            ProviderType::OpenAi => self.openai.as_ref(),
            ProviderType::DeepSeek => self.deepseek.as_ref(),
        }
    }

    /// Resolve a wire-format provider name (`?type=` query parameter) to a
    /// configured client.
    ///
    /// # Errors
    /// [`LlmError::ModelNotFound`] for unknown names and for known but
    /// unconfigured providers — callers surface the same message either way.
    pub fn resolve(&self, provider: &str) -> Result<&LlmClient, LlmError> {
        let provider_type = ProviderType::from_str(provider)?;
        self.get(provider_type).ok_or(LlmError::ModelNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!("openai".parse::<ProviderType>().unwrap(), ProviderType::OpenAi);
        assert_eq!("deepseek".parse::<ProviderType>().unwrap(), ProviderType::DeepSeek);
        assert!(matches!("claude".parse::<ProviderType>(), Err(LlmError::ModelNotFound)));
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = ProviderRegistry::empty();
        assert!(matches!(registry.resolve("openai"), Err(LlmError::ModelNotFound)));
        assert!(matches!(registry.resolve("unknown"), Err(LlmError::ModelNotFound)));
    }

    #[test]
    fn test_registry_from_config_uses_proxy_url() {
        let vars = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/taze"),
            ("REDIS_URL", "redis://localhost:6379/0"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_PROXY_URL", "https://proxy.example.com/"),
        ]);
        let lookup = move |var: &str| vars.get(var).map(|v| (*v).to_owned());
        let config = Config::from_lookup(&lookup).expect("valid config");
        let registry = ProviderRegistry::from_config(&config).expect("registry");
        let client = registry.resolve("openai").expect("openai configured");
        assert_eq!(client.base_url(), "https://proxy.example.com");
        assert!(registry.resolve("deepseek").is_err());
    }
}
