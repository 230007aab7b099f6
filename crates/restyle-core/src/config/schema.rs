//! Configuration schema.
//!
//! Hierarchy: `Config` → `ServerConfig`, `ProviderSettings`, `ProvidersConfig`,
//! `AccountsConfig`, `ConversionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.restyle/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderSettings,
    pub providers: ProvidersConfig,
    pub accounts: AccountsConfig,
    pub conversion: ConversionConfig,
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the convert endpoint is mounted on.
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            route: "/api/convert".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Which provider serves conversions, and the generation parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Registry name of the active provider (`deepseek`, `openai`, `gemini`, `anthropic`).
    pub active: String,
    /// Provider request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            active: "deepseek".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Credentials and endpoint overrides for a single provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Model override (defaults to the provider's registry model).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// One `ProviderConfig` per supported backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub deepseek: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (e.g. `"gemini"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "deepseek" => Some(&self.deepseek),
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            "anthropic" => Some(&self.anthropic),
            _ => None,
        }
    }

    /// Mutable variant of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "deepseek" => Some(&mut self.deepseek),
            "openai" => Some(&mut self.openai),
            "gemini" => Some(&mut self.gemini),
            "anthropic" => Some(&mut self.anthropic),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────

/// Authentication and quota enforcement via the identity/database service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountsConfig {
    /// When false the endpoint runs without authentication or quota.
    pub enabled: bool,
    /// Base URL of the Supabase project (e.g. `https://xyz.supabase.co`).
    pub supabase_url: String,
    /// Service-role key used for identity checks and profile writes.
    pub service_key: String,
    /// Allotment given to a caller whose profile does not exist yet.
    pub default_daily_quota: i64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            supabase_url: String::new(),
            service_key: String::new(),
            default_daily_quota: 5,
        }
    }
}

impl AccountsConfig {
    /// Whether the Supabase URL and service key are both set.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.service_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────

/// Input validation and usage-log limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionConfig {
    /// Style used when the request omits one.
    pub default_style: String,
    /// Minimum trimmed input length, in UTF-16 code units, when accounts are enabled.
    pub min_input_chars: usize,
    /// Max UTF-16 code units of input text stored per usage log entry.
    pub input_log_limit: usize,
    /// Max UTF-16 code units of output text stored per usage log entry.
    pub output_log_limit: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_style: "trendy".to_string(),
            min_input_chars: 5,
            input_log_limit: 5000,
            output_log_limit: 10000,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
