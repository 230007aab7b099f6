use async_trait::async_trait;

use restyle_core::{Identity, NewProfile, UsageLogEntry, UserProfile};

use crate::error::AccountError;

/// Verifies bearer credentials against the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to a user. `Ok(None)` means the token was rejected.
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AccountError>;
}

/// Per-user profile rows holding the quota counters.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the quota fields of a user's profile, `None` if the row doesn't exist.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AccountError>;

    /// Insert (or merge into) the profile row for a new user.
    async fn create_profile(&self, profile: &NewProfile) -> Result<(), AccountError>;

    /// Atomically decrement `daily_quota_remaining` if it is positive.
    ///
    /// Returns the new remaining value, or `None` when there was nothing left
    /// to consume (or no profile row).
    async fn consume_quota(&self, user_id: &str) -> Result<Option<i64>, AccountError>;
}

/// Append-only log of successful conversions.
#[async_trait]
pub trait UsageLogStore: Send + Sync {
    async fn append(&self, entry: &UsageLogEntry) -> Result<(), AccountError>;
}
