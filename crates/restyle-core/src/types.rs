//! Wire and record types shared by the handler, the providers and the account store.
//!
//! The HTTP envelope uses **camelCase** keys (`convertedText`, `inputLength`);
//! records written to the account store use the store's snake_case columns.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConvertError;
use crate::utils::{short_id, text_len, timestamp, truncate_text};

// ─────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────

/// Body of a convert request: `{ "text": "...", "style": "..." }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConvertRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl ConvertRequest {
    /// Parse a raw request body.
    ///
    /// An empty body is treated as a request with no text, so it fails
    /// validation as `EMPTY_INPUT` rather than as a parse error.
    pub fn from_slice(body: &[u8]) -> Result<Self, ConvertError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|_| ConvertError::Parse)
    }

    /// The requested style, or `default_style` when absent.
    pub fn style_or<'a>(&'a self, default_style: &'a str) -> &'a str {
        self.style.as_deref().unwrap_or(default_style)
    }
}

// ─────────────────────────────────────────────
// Response envelope
// ─────────────────────────────────────────────

/// JSON envelope returned for every non-OPTIONS request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
}

impl Envelope {
    /// A successful conversion.
    pub fn converted(text: impl Into<String>, usage: UsageSummary) -> Self {
        Self {
            success: true,
            converted_text: Some(text.into()),
            usage: Some(usage),
            ..Default::default()
        }
    }

    /// Attach the caller's remaining quota and identity summary.
    pub fn with_account(mut self, remaining: i64, user: UserSummary) -> Self {
        self.remaining = Some(remaining);
        self.user = Some(user);
        self
    }

    /// A failed request.
    pub fn failure(error: &ConvertError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            code: Some(error.code().to_string()),
            remaining: error.remaining(),
            ..Default::default()
        }
    }
}

/// Caller identity as echoed back in the envelope (id is shortened).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub email: Option<String>,
    pub id: String,
}

/// Input/output lengths of a conversion, in UTF-16 code units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub input_length: usize,
    pub output_length: usize,
}

impl UsageSummary {
    pub fn measure(input: &str, output: &str) -> Self {
        Self {
            input_length: text_len(input),
            output_length: text_len(output),
        }
    }
}

// ─────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────

/// A verified caller, as returned by the identity service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.map(String::from),
        }
    }

    /// Summary safe to return to the caller: only the first 8 chars of the id.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            email: self.email.clone(),
            id: format!("{}...", short_id(&self.id)),
        }
    }
}

/// Quota fields of a caller's profile row. Missing or `null` columns read as 0.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub daily_quota_remaining: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_used: i64,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Row written when a caller has no profile yet.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewProfile {
    pub id: String,
    pub email: Option<String>,
    pub daily_quota_remaining: i64,
    pub total_quota_purchased: i64,
    pub total_used: i64,
    pub role: String,
    pub updated_at: String,
}

impl NewProfile {
    pub fn for_identity(identity: &Identity, daily_quota: i64) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            daily_quota_remaining: daily_quota,
            total_quota_purchased: 0,
            total_used: 0,
            role: "user".to_string(),
            updated_at: timestamp(),
        }
    }
}

/// One append-only usage log row, written per successful conversion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageLogEntry {
    pub user_id: String,
    pub input_text: String,
    pub output_text: String,
    pub metadata: UsageMetadata,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageMetadata {
    pub style: String,
    pub input_length: usize,
    pub output_length: usize,
    pub model: String,
}

impl UsageLogEntry {
    /// Build a log entry. Stored texts are cut to `input_limit` / `output_limit`
    /// UTF-16 code units; the recorded lengths are those of the full texts.
    pub fn new(
        user_id: &str,
        input: &str,
        output: &str,
        style: &str,
        model: &str,
        input_limit: usize,
        output_limit: usize,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            input_text: truncate_text(input, input_limit),
            output_text: truncate_text(output, output_limit),
            metadata: UsageMetadata {
                style: style.to_string(),
                input_length: text_len(input),
                output_length: text_len(output),
                model: model.to_string(),
            },
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
