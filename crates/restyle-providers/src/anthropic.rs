//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use restyle_core::config::ProviderConfig;

use crate::error::ProviderError;
use crate::prompt::{build_user_prompt, SYSTEM_INSTRUCTION};
use crate::registry::ProviderSpec;
use crate::traits::{GenerationConfig, TextGenerator};
use crate::transport::{non_blank, send_json};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first `text` block.
    fn into_text(self) -> Option<String> {
        let text = self
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text);
        non_blank(text)
    }
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    generation: GenerationConfig,
    spec: &'static ProviderSpec,
}

impl AnthropicProvider {
    pub fn new(
        client: reqwest::Client,
        config: &ProviderConfig,
        spec: &'static ProviderSpec,
        generation: GenerationConfig,
    ) -> Self {
        Self {
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

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    async fn generate(&self, text: &str, style: &str) -> Result<Option<String>, ProviderError> {
        debug!(model = %self.model, chars = text.chars().count(), "Calling Anthropic");

        let user_prompt = build_user_prompt(text, style);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            system: SYSTEM_INSTRUCTION,
            messages: [UserMessage {
                role: "user",
                content: &user_prompt,
            }],
        };

        let request = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(self.spec.display_name, request).await?;
        Ok(response.into_text())
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
