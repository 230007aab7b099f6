//! Provider registry: static specs for the supported text-generation providers.
//!
//! Each `ProviderSpec` describes how to reach one provider: the env var that
//! holds its key, its default endpoint and model, and which wire format it speaks.

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Request/response envelope a provider speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFormat {
    /// OpenAI-style `POST /chat/completions`, text at `choices[0].message.content`.
    ChatCompletions,
    /// Google `POST /models/{model}:generateContent`, text at `candidates[0].content.parts`.
    Gemini,
    /// Anthropic `POST /messages`, text in the `content` blocks.
    Anthropic,
}

/// Static specification describing one provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"deepseek"`), also the config key.
    pub name: &'static str,
    /// Environment variable for the API key. E.g. `"DEEPSEEK_API_KEY"`.
    pub env_key: &'static str,
    /// Human-readable name for logs. E.g. `"DeepSeek"`.
    pub display_name: &'static str,
    /// Model used when the config doesn't override it.
    pub default_model: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Wire format.
    pub format: ApiFormat,
}

// ─────────────────────────────────────────────
// Supported providers
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "deepseek",
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        default_model: "deepseek-chat",
        default_api_base: "https://api.deepseek.com",
        format: ApiFormat::ChatCompletions,
    },
    ProviderSpec {
        name: "openai",
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        default_model: "gpt-4o-mini",
        default_api_base: "https://api.openai.com/v1",
        format: ApiFormat::ChatCompletions,
    },
    ProviderSpec {
        name: "gemini",
        env_key: "GEMINI_API_KEY",
        display_name: "Gemini",
        default_model: "gemini-1.5-flash",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        format: ApiFormat::Gemini,
    },
    ProviderSpec {
        name: "anthropic",
        env_key: "ANTHROPIC_API_KEY",
        display_name: "Anthropic",
        default_model: "claude-3-5-haiku-latest",
        default_api_base: "https://api.anthropic.com/v1",
        format: ApiFormat::Anthropic,
    },
];

/// Find a provider spec by exact name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
