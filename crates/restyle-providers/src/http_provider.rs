//! HTTP provider for OpenAI-compatible chat completions APIs.
//!
//! Talks directly to any `/chat/completions` endpoint.
//! Covers: DeepSeek, OpenAI.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use restyle_core::config::{ProviderConfig, ProviderSettings, ProvidersConfig};

use crate::anthropic::AnthropicProvider;
use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::prompt::{build_user_prompt, SYSTEM_INSTRUCTION};
use crate::registry::{find_by_name, ApiFormat, ProviderSpec};
use crate::traits::{GenerationConfig, TextGenerator};
use crate::transport::{build_client, non_blank, send_json};

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Option<String> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        non_blank(content)
    }
}

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible chat completions API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.deepseek.com"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model sent with each request.
    model: String,
    /// Temperature, max_tokens.
    generation: GenerationConfig,
    /// Static provider spec.
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider.
    ///
    /// # Arguments
    /// * `client`    : Shared HTTP client (carries the request timeout)
    /// * `config`    : User's config (api_key, api_base, model)
    /// * `spec`      : Static provider spec from the registry
    /// * `generation`: Temperature and max_tokens
    pub fn new(
        client: reqwest::Client,
        config: &ProviderConfig,
        spec: &'static ProviderSpec,
        generation: GenerationConfig,
    ) -> Self {
        HttpProvider {
            client,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| spec.default_api_base.to_string()),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| spec.default_model.to_string()),
            generation,
            spec,
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl TextGenerator for HttpProvider {
    async fn generate(&self, text: &str, style: &str) -> Result<Option<String>, ProviderError> {
        debug!(
            provider = self.spec.display_name,
            model = %self.model,
            chars = text.chars().count(),
            "Calling chat completions"
        );

        let user_prompt = build_user_prompt(text, style);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.generation.temperature,
            max_tokens: self.generation.max_tokens,
            stream: false,
        };

        let request = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatCompletionResponse = send_json(self.spec.display_name, request).await?;
        let text = response.into_text();

        debug!(
            provider = self.spec.display_name,
            has_content = text.is_some(),
            "Chat completion received"
        );
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn env_key(&self) -> &str {
        self.spec.env_key
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build the provider named by `settings.active`.
///
/// A provider without an API key is still built: the handler reports the
/// missing key per request rather than refusing to start.
pub fn create_provider(
    settings: &ProviderSettings,
    providers: &ProvidersConfig,
) -> Result<Arc<dyn TextGenerator>, ProviderError> {
    let spec = find_by_name(&settings.active)
        .ok_or_else(|| ProviderError::UnknownProvider(settings.active.clone()))?;
    let config = providers.get_by_name(spec.name).cloned().unwrap_or_default();
    let client = build_client(Duration::from_secs(settings.timeout_secs))?;
    let generation = GenerationConfig::from(settings);

    debug!(
        provider = spec.display_name,
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        configured = config.is_configured(),
        "Creating text generator"
    );

    let provider: Arc<dyn TextGenerator> = match spec.format {
        ApiFormat::ChatCompletions => Arc::new(HttpProvider::new(client, &config, spec, generation)),
        ApiFormat::Gemini => Arc::new(GeminiProvider::new(client, &config, spec, generation)),
        ApiFormat::Anthropic => Arc::new(AnthropicProvider::new(client, &config, spec, generation)),
    };
    Ok(provider)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
