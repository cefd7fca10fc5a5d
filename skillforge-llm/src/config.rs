//! Content generator configuration and provider selection.

use crate::providers::anthropic::generator::DEFAULT_ANTHROPIC_MODEL;
use crate::providers::gemini::generator::DEFAULT_GEMINI_MODEL;
use crate::{AnthropicTaskGenerator, GeminiTaskGenerator, TaskGenerator};
use skillforge_core::{ConfigError, ForgeError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Supported content generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl LlmProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => DEFAULT_GEMINI_MODEL,
            LlmProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Gemini => f.write_str("gemini"),
            LlmProvider::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            other => Err(ConfigError::ProviderNotSupported {
                provider: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// GENERATOR CONFIGURATION
// ============================================================================

/// Settings for the content generator.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub provider: LlmProvider,
    /// API key for the selected provider. Required to build a generator.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub max_concurrent_requests: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_concurrent_requests: 16,
        }
    }
}

impl GeneratorConfig {
    /// Load generator configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SKILLFORGE_LLM_PROVIDER`: "gemini" or "anthropic" (default: gemini)
    /// - `GEMINI_API_KEY` / `ANTHROPIC_API_KEY`: key for the chosen provider
    /// - `SKILLFORGE_LLM_MODEL`: model override (default depends on provider)
    /// - `SKILLFORGE_LLM_TIMEOUT_SECS`: HTTP timeout (default: 60)
    /// - `SKILLFORGE_LLM_MAX_CONCURRENT_REQUESTS`: in-flight request cap (default: 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match std::env::var("SKILLFORGE_LLM_PROVIDER") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => LlmProvider::default(),
        };

        let api_key = std::env::var(provider.api_key_var())
            .ok()
            .filter(|k| !k.trim().is_empty());

        let model = std::env::var("SKILLFORGE_LLM_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs = std::env::var("SKILLFORGE_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let max_concurrent_requests = std::env::var("SKILLFORGE_LLM_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16);

        Ok(Self {
            provider,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
            max_concurrent_requests,
        })
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}

/// Build the configured generator.
///
/// Fails with a config error when the provider's API key is missing.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn TaskGenerator>, ForgeError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ConfigError::MissingRequired {
            field: config.provider.api_key_var().to_string(),
        })?;

    let generator: Arc<dyn TaskGenerator> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiTaskGenerator::new(
            api_key,
            config.model.clone(),
            config.max_concurrent_requests,
            config.timeout,
        )?),
        LlmProvider::Anthropic => Arc::new(AnthropicTaskGenerator::new(
            api_key,
            config.model.clone(),
            config.max_concurrent_requests,
            config.timeout,
        )?),
    };
    Ok(generator)
}
