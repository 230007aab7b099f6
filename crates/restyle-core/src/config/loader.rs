//! Config loader: reads `~/.restyle/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.restyle/config.json`
//! 3. Conventional provider/service variables (`DEEPSEEK_API_KEY`, `SUPABASE_URL`, …)
//! 4. Environment variables `RESTYLE_<SECTION>__<FIELD>`

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Provider names paired with their conventional API key variable.
const PROVIDER_ENV_KEYS: &[(&str, &str)] = &[
    ("deepseek", "DEEPSEEK_API_KEY"),
    ("openai", "OPENAI_API_KEY"),
    ("gemini", "GEMINI_API_KEY"),
    ("anthropic", "ANTHROPIC_API_KEY"),
];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Conventional variables:
/// - `DEEPSEEK_API_KEY`, `OPENAI_API_KEY`, `GEMINI_API_KEY`, `ANTHROPIC_API_KEY`
/// - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`
///
/// Prefixed overrides (double underscore as delimiter):
/// - `RESTYLE_SERVER__HOST`, `RESTYLE_SERVER__PORT`, `RESTYLE_SERVER__ROUTE`
/// - `RESTYLE_PROVIDER__ACTIVE`, `RESTYLE_PROVIDER__TIMEOUT_SECS`,
///   `RESTYLE_PROVIDER__TEMPERATURE`, `RESTYLE_PROVIDER__MAX_TOKENS`
/// - `RESTYLE_PROVIDERS__<NAME>__API_KEY`, `__API_BASE`, `__MODEL`
/// - `RESTYLE_ACCOUNTS__ENABLED`, `RESTYLE_ACCOUNTS__DEFAULT_DAILY_QUOTA`
/// - `RESTYLE_CONVERSION__DEFAULT_STYLE`, `RESTYLE_CONVERSION__MIN_INPUT_CHARS`
pub fn apply_env_overrides(mut config: Config) -> Config {
    // Conventional names
    for (name, env_key) in PROVIDER_ENV_KEYS {
        if let (Some(val), Some(provider)) = (env_var(env_key), config.providers.get_by_name_mut(name)) {
            provider.api_key = val;
        }
    }
    if let Some(val) = env_var("SUPABASE_URL") {
        config.accounts.supabase_url = val;
    }
    if let Some(val) = env_var("SUPABASE_SERVICE_ROLE_KEY") {
        config.accounts.service_key = val;
    }

    // Server
    if let Some(val) = env_var("RESTYLE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(p) = env_parse::<u16>("RESTYLE_SERVER__PORT") {
        config.server.port = p;
    }
    if let Some(val) = env_var("RESTYLE_SERVER__ROUTE") {
        config.server.route = val;
    }

    // Provider selection and parameters
    if let Some(val) = env_var("RESTYLE_PROVIDER__ACTIVE") {
        config.provider.active = val.to_lowercase();
    }
    if let Some(n) = env_parse::<u64>("RESTYLE_PROVIDER__TIMEOUT_SECS") {
        config.provider.timeout_secs = n;
    }
    if let Some(t) = env_parse::<f64>("RESTYLE_PROVIDER__TEMPERATURE") {
        config.provider.temperature = t;
    }
    if let Some(n) = env_parse::<u32>("RESTYLE_PROVIDER__MAX_TOKENS") {
        config.provider.max_tokens = n;
    }

    // Per-provider overrides
    for (name, _) in PROVIDER_ENV_KEYS {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, &name.to_uppercase());
        }
    }

    // Accounts
    if let Some(val) = env_var("RESTYLE_ACCOUNTS__ENABLED") {
        config.accounts.enabled = val == "true" || val == "1";
    }
    if let Some(n) = env_parse::<i64>("RESTYLE_ACCOUNTS__DEFAULT_DAILY_QUOTA") {
        config.accounts.default_daily_quota = n;
    }

    // Conversion
    if let Some(val) = env_var("RESTYLE_CONVERSION__DEFAULT_STYLE") {
        config.conversion.default_style = val;
    }
    if let Some(n) = env_parse::<usize>("RESTYLE_CONVERSION__MIN_INPUT_CHARS") {
        config.conversion.min_input_chars = n;
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Some(val) = env_var(&format!("RESTYLE_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = env_var(&format!("RESTYLE_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if let Some(val) = env_var(&format!("RESTYLE_PROVIDERS__{name}__MODEL")) {
        provider.model = Some(val);
    }
}

/// Read a non-empty env var.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}: cannot parse {:?}", key, raw);
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
