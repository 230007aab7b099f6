//! Text-generation provider layer for Restyle.
//!
//! # Architecture
//!
//! - [`traits::TextGenerator`]: trait that every provider implements
//! - [`registry`]: static specs for the supported providers
//! - [`http_provider::HttpProvider`]: OpenAI-compatible chat completions (DeepSeek, OpenAI)
//! - [`gemini::GeminiProvider`]: Google `generateContent`
//! - [`anthropic::AnthropicProvider`]: Anthropic Messages API
//! - [`http_provider::create_provider`]: builder from config
//! - [`prompt`]: the fixed persona and prompt template

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod http_provider;
pub mod prompt;
pub mod registry;
pub mod traits;
mod transport;

// Re-export main types for convenience
pub use error::ProviderError;
pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ApiFormat, ProviderSpec, PROVIDERS};
pub use traits::{GenerationConfig, TextGenerator};
