//! Provider failures and their mapping onto the caller-facing taxonomy.

use restyle_core::ConvertError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("provider rejected the API key")]
    AuthFailed,

    #[error("provider returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("provider request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid provider response: {0}")]
    Parse(String),

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response.
    ///
    /// 429 and 401 are recognized by status alone; anything else carries the
    /// provider's `error.message`, the raw JSON body, or `HTTP <status>` when
    /// the body is not JSON.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => Self::RateLimited,
            401 => Self::AuthFailed,
            _ => Self::Service {
                status,
                message: error_message(status, body),
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<ProviderError> for ConvertError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::RateLimited => ConvertError::RateLimited,
            ProviderError::AuthFailed => ConvertError::ProviderAuthFailed,
            ProviderError::Service { message, .. } => ConvertError::ProviderService(message),
            ProviderError::Timeout => ConvertError::Timeout,
            ProviderError::Network(_) => ConvertError::Network,
            ProviderError::Parse(_) => ConvertError::Parse,
            other @ (ProviderError::UnknownProvider(_) | ProviderError::Client(_)) => {
                ConvertError::Unknown(other.to_string())
            }
        }
    }
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value["error"]["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| value.to_string()),
        Err(_) => format!("HTTP {status}"),
    }
}
