//! Text generator trait: the single capability the handler needs from a provider.
//!
//! Every backend (DeepSeek, OpenAI, Gemini, Anthropic) implements this trait;
//! the handler never sees a provider-specific envelope.

use async_trait::async_trait;

use restyle_core::config::ProviderSettings;

use crate::error::ProviderError;

/// Generation parameters passed to each provider call.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

impl From<&ProviderSettings> for GenerationConfig {
    fn from(settings: &ProviderSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// Trait that all text-generation providers must implement.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Restyle `text` in the requested `style`.
    ///
    /// Returns `Ok(None)` when the provider answered successfully but the
    /// envelope carried no usable text.
    async fn generate(&self, text: &str, style: &str) -> Result<Option<String>, ProviderError>;

    /// Whether an API key is available for this provider.
    fn is_configured(&self) -> bool;

    /// Environment variable expected to hold the API key.
    fn env_key(&self) -> &str;

    /// Model identifier sent to the provider (recorded in usage logs).
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
