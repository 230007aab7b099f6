//! Google Gemini provider (`models/{model}:generateContent`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use restyle_core::config::ProviderConfig;

use crate::error::ProviderError;
use crate::prompt::{build_user_prompt, SYSTEM_INSTRUCTION};
use crate::registry::ProviderSpec;
use crate::traits::{GenerationConfig, TextGenerator};
use crate::transport::{non_blank, send_json};

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        non_blank(Some(text))
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    generation: GenerationConfig,
    spec: &'static ProviderSpec,
}

impl GeminiProvider {
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

    fn generate_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, text: &str, style: &str) -> Result<Option<String>, ProviderError> {
        debug!(model = %self.model, chars = text.chars().count(), "Calling Gemini");

        let user_prompt = build_user_prompt(text, style);
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: &user_prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.generation.temperature,
                max_output_tokens: self.generation.max_tokens,
            },
        };

        let request = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let response: GenerateContentResponse = send_json(self.spec.display_name, request).await?;
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
