//! Error taxonomy surfaced to callers of the convert endpoint.
//!
//! Each variant maps to one HTTP status and one machine-readable code.
//! The `Display` text is the human-readable `error` field of the envelope.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Please sign in first")]
    AuthRequired,

    #[error("Your session has expired, please sign in again")]
    InvalidToken,

    #[error("Today's free conversions are used up, redeem a code to continue")]
    QuotaExhausted,

    #[error("Failed to load user profile")]
    ProfileFetchFailed,

    #[error("Failed to initialize user profile")]
    ProfileCreateFailed,

    #[error("Please enter some content")]
    EmptyInput,

    #[error("Content is too short, enter at least {min} characters")]
    InputTooShort { min: usize },

    #[error("Server configuration error: {env_key} not found")]
    ApiKeyMissing { env_key: String },

    #[error("AI service is receiving too many requests, please retry later")]
    RateLimited,

    #[error("AI service authentication failed")]
    ProviderAuthFailed,

    #[error("{0}")]
    ProviderService(String),

    #[error("Network request failed, please check the connection")]
    Network,

    #[error("Request timed out, please retry later")]
    Timeout,

    #[error("Failed to parse data")]
    Parse,

    #[error("{0}")]
    Unknown(String),

    #[error("Only POST requests are supported")]
    MethodNotAllowed,
}

impl ConvertError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::AuthRequired | Self::InvalidToken => 401,
            Self::QuotaExhausted => 403,
            Self::EmptyInput | Self::InputTooShort { .. } => 400,
            Self::MethodNotAllowed => 405,
            Self::ProfileFetchFailed
            | Self::ProfileCreateFailed
            | Self::ApiKeyMissing { .. }
            | Self::RateLimited
            | Self::ProviderAuthFailed
            | Self::ProviderService(_)
            | Self::Network
            | Self::Timeout
            | Self::Parse
            | Self::Unknown(_) => 500,
        }
    }

    /// Machine-readable code for the envelope's `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::QuotaExhausted => "QUOTA_EXHAUSTED",
            Self::ProfileFetchFailed => "PROFILE_FETCH_FAILED",
            Self::ProfileCreateFailed => "PROFILE_CREATE_FAILED",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::InputTooShort { .. } => "INPUT_TOO_SHORT",
            Self::ApiKeyMissing { .. } => "API_KEY_MISSING",
            Self::RateLimited => "RATE_LIMITED",
            Self::ProviderAuthFailed => "AI_AUTH_FAILED",
            Self::ProviderService(_) => "AI_SERVICE_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Parse => "PARSE_ERROR",
            Self::Unknown(_) => "UNKNOWN_ERROR",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        }
    }

    /// Remaining quota to report alongside the error, if any.
    pub fn remaining(&self) -> Option<i64> {
        match self {
            Self::QuotaExhausted => Some(0),
            _ => None,
        }
    }
}
