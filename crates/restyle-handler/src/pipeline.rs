//! The conversion pipeline.
//!
//! One request flows through:
//! 1. Method check (`OPTIONS` short-circuits, anything but `POST` is rejected)
//! 2. Account gate, when configured: bearer auth, then quota
//! 3. Text validation
//! 4. Provider credential check
//! 5. Generation
//! 6. Bookkeeping (quota decrement + usage log), when gated
//!
//! Every failure ends the request with a [`ConvertError`]; nothing after the
//! provider call can turn a success into a failure.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use tracing::{debug, error, info, warn};

use restyle_accounts::{IdentityProvider, ProfileStore, UsageLogStore};
use restyle_core::config::{AccountsConfig, Config, ConversionConfig};
use restyle_core::utils::{short_id, text_len};
use restyle_core::{
    ConvertError, ConvertRequest, Envelope, Identity, NewProfile, UsageLogEntry, UsageSummary,
};
use restyle_providers::prompt::FALLBACK_TEXT;
use restyle_providers::{create_provider, TextGenerator};

use crate::error::SetupError;

// ─────────────────────────────────────────────
// Account gate
// ─────────────────────────────────────────────

/// Authentication, quota and usage logging, applied together or not at all.
#[derive(Clone)]
pub struct AccountGate {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub usage_log: Arc<dyn UsageLogStore>,
    /// Allotment given to a caller whose profile row doesn't exist yet.
    pub default_daily_quota: i64,
}

impl AccountGate {
    /// Gate backed by one store implementing every account port.
    pub fn from_store<S>(store: Arc<S>, default_daily_quota: i64) -> Self
    where
        S: IdentityProvider + ProfileStore + UsageLogStore + 'static,
    {
        Self {
            identity: store.clone(),
            profiles: store.clone(),
            usage_log: store,
            default_daily_quota,
        }
    }

    /// Resolve the `Authorization` header to a verified caller.
    async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, ConvertError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ConvertError::AuthRequired)?;

        match self.identity.verify(token).await {
            Ok(Some(identity)) => {
                info!(user = short_id(&identity.id), "caller authenticated");
                Ok(identity)
            }
            Ok(None) => {
                debug!("bearer token rejected");
                Err(ConvertError::InvalidToken)
            }
            Err(e) => {
                error!(error = %e, "identity check failed");
                Err(ConvertError::InvalidToken)
            }
        }
    }

    /// Current remaining quota, creating the profile on first use.
    async fn check_quota(&self, identity: &Identity) -> Result<i64, ConvertError> {
        let user = short_id(&identity.id);

        let profile = match self.fetch(identity).await? {
            Some(profile) => Some(profile),
            None => {
                info!(user, quota = self.default_daily_quota, "creating profile");
                let new_profile = NewProfile::for_identity(identity, self.default_daily_quota);
                self.profiles.create_profile(&new_profile).await.map_err(|e| {
                    error!(user, error = %e, "profile creation failed");
                    ConvertError::ProfileCreateFailed
                })?;
                self.fetch(identity).await?
            }
        };

        match profile {
            Some(profile) if profile.daily_quota_remaining > 0 => {
                debug!(
                    user,
                    remaining = profile.daily_quota_remaining,
                    total_used = profile.total_used,
                    "quota available"
                );
                Ok(profile.daily_quota_remaining)
            }
            _ => {
                info!(user, "daily quota exhausted");
                Err(ConvertError::QuotaExhausted)
            }
        }
    }

    async fn fetch(
        &self,
        identity: &Identity,
    ) -> Result<Option<restyle_core::UserProfile>, ConvertError> {
        self.profiles.fetch_profile(&identity.id).await.map_err(|e| {
            error!(user = short_id(&identity.id), error = %e, "profile lookup failed");
            ConvertError::ProfileFetchFailed
        })
    }

    /// Decrement quota and log the conversion. Failures are logged only.
    ///
    /// Returns the remaining quota to report to the caller.
    async fn record(&self, identity: &Identity, checked_remaining: i64, entry: &UsageLogEntry) -> i64 {
        let user = short_id(&identity.id);

        let remaining = match self.profiles.consume_quota(&identity.id).await {
            Ok(Some(remaining)) => remaining,
            Ok(None) => {
                warn!(user, "quota was consumed concurrently, nothing left to decrement");
                0
            }
            Err(e) => {
                error!(user, error = %e, "quota decrement failed");
                (checked_remaining - 1).max(0)
            }
        };

        if let Err(e) = self.usage_log.append(entry).await {
            error!(user, error = %e, "usage log write failed");
        }

        remaining
    }
}

// ─────────────────────────────────────────────
// Reply
// ─────────────────────────────────────────────

/// Outcome of one pipeline run: a status and, except for `OPTIONS`, an envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub envelope: Option<Envelope>,
}

impl Reply {
    fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            envelope: None,
        }
    }

    fn ok(envelope: Envelope) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Some(envelope),
        }
    }

    fn failure(error: &ConvertError) -> Self {
        Self {
            status: StatusCode::from_u16(error.status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            envelope: Some(Envelope::failure(error)),
        }
    }
}

// ─────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────

#[derive(Clone)]
pub struct ConvertPipeline {
    generator: Arc<dyn TextGenerator>,
    accounts: Option<AccountGate>,
    conversion: ConversionConfig,
}

impl ConvertPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, conversion: ConversionConfig) -> Self {
        Self {
            generator,
            accounts: None,
            conversion,
        }
    }

    /// Require authentication and enforce quota on every request.
    pub fn with_accounts(mut self, gate: AccountGate) -> Self {
        self.accounts = Some(gate);
        self
    }

    /// Build from configuration. With `accounts.enabled` the gate is backed
    /// by Supabase.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let generator = create_provider(&config.provider, &config.providers)?;
        let pipeline = Self::new(generator, config.conversion.clone());

        if !config.accounts.enabled {
            return Ok(pipeline);
        }
        let gate = supabase_gate(&config.accounts)?;
        Ok(pipeline.with_accounts(gate))
    }

    pub fn is_gated(&self) -> bool {
        self.accounts.is_some()
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// Run one request through the pipeline.
    pub async fn handle(&self, method: &Method, authorization: Option<&str>, body: &[u8]) -> Reply {
        self.handle_body(method, authorization, Ok(body)).await
    }

    /// Like [`handle`](Self::handle), for a body that may have failed to
    /// read. The read error surfaces at the parse step, after the gate.
    pub async fn handle_body(
        &self,
        method: &Method,
        authorization: Option<&str>,
        body: Result<&[u8], ConvertError>,
    ) -> Reply {
        if *method == Method::OPTIONS {
            return Reply::preflight();
        }
        if *method != Method::POST {
            return Reply::failure(&ConvertError::MethodNotAllowed);
        }

        match self.convert(authorization, body).await {
            Ok(envelope) => Reply::ok(envelope),
            Err(e) => {
                debug!(code = e.code(), status = e.status(), "conversion rejected");
                Reply::failure(&e)
            }
        }
    }

    async fn convert(
        &self,
        authorization: Option<&str>,
        body: Result<&[u8], ConvertError>,
    ) -> Result<Envelope, ConvertError> {
        let admitted = match &self.accounts {
            Some(gate) => {
                let identity = gate.authenticate(authorization).await?;
                let remaining = gate.check_quota(&identity).await?;
                Some((gate, identity, remaining))
            }
            None => None,
        };

        let request = ConvertRequest::from_slice(body?)?;
        let text = self.validate(&request, admitted.is_some())?;
        let style = request.style_or(&self.conversion.default_style);

        if !self.generator.is_configured() {
            error!(provider = self.generator.display_name(), "provider API key is not configured");
            return Err(ConvertError::ApiKeyMissing {
                env_key: self.generator.env_key().to_string(),
            });
        }

        info!(
            provider = self.generator.display_name(),
            style,
            chars = text_len(text),
            "converting"
        );
        let converted = match self.generator.generate(text, style).await {
            Ok(Some(converted)) => converted,
            Ok(None) => {
                warn!(provider = self.generator.display_name(), "provider returned no text");
                FALLBACK_TEXT.to_string()
            }
            Err(e) => {
                error!(provider = self.generator.display_name(), error = %e, "generation failed");
                return Err(e.into());
            }
        };
        info!(chars = text_len(&converted), "conversion complete");

        let envelope = Envelope::converted(converted.clone(), UsageSummary::measure(text, &converted));

        match admitted {
            Some((gate, identity, checked_remaining)) => {
                let entry = UsageLogEntry::new(
                    &identity.id,
                    text,
                    &converted,
                    style,
                    self.generator.model(),
                    self.conversion.input_log_limit,
                    self.conversion.output_log_limit,
                );
                let remaining = gate.record(&identity, checked_remaining, &entry).await;
                Ok(envelope.with_account(remaining, identity.summary()))
            }
            None => Ok(envelope),
        }
    }

    /// Text to convert, untrimmed. The minimum length applies only to
    /// authenticated callers.
    fn validate<'a>(&self, request: &'a ConvertRequest, gated: bool) -> Result<&'a str, ConvertError> {
        let text = request.text.as_deref().unwrap_or_default();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        if gated && text_len(trimmed) < self.conversion.min_input_chars {
            return Err(ConvertError::InputTooShort {
                min: self.conversion.min_input_chars,
            });
        }
        Ok(text)
    }
}

fn supabase_gate(accounts: &AccountsConfig) -> Result<AccountGate, SetupError> {
    if !accounts.is_configured() {
        return Err(SetupError::AccountsNotConfigured);
    }
    let client = restyle_accounts::SupabaseClient::new(&accounts.supabase_url, &accounts.service_key)?;
    Ok(AccountGate::from_store(
        Arc::new(client),
        accounts.default_daily_quota,
    ))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
