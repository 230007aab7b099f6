//! In-process account store.
//!
//! Backs `restyle serve --dev` and the handler tests. Tokens are looked up
//! verbatim; there is no expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use restyle_core::{Identity, NewProfile, UsageLogEntry, UserProfile};

use crate::error::AccountError;
use crate::ports::{IdentityProvider, ProfileStore, UsageLogStore};

#[derive(Debug, Default)]
pub struct MemoryAccounts {
    tokens: Mutex<HashMap<String, Identity>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    logs: Mutex<Vec<UsageLogEntry>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bearer token for `identity`.
    pub fn with_user(self, token: &str, identity: Identity) -> Self {
        lock(&self.tokens).insert(token.to_string(), identity);
        self
    }

    /// Seed a profile row with `remaining` daily quota.
    pub fn with_profile(self, user_id: &str, remaining: i64) -> Self {
        lock(&self.profiles).insert(
            user_id.to_string(),
            UserProfile {
                daily_quota_remaining: remaining,
                total_used: 0,
            },
        );
        self
    }

    pub fn profile(&self, user_id: &str) -> Option<UserProfile> {
        lock(&self.profiles).get(user_id).copied()
    }

    pub fn usage_logs(&self) -> Vec<UsageLogEntry> {
        lock(&self.logs).clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryAccounts {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AccountError> {
        Ok(lock(&self.tokens).get(token).cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryAccounts {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AccountError> {
        Ok(self.profile(user_id))
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), AccountError> {
        // Merge semantics: an existing row wins.
        lock(&self.profiles)
            .entry(profile.id.clone())
            .or_insert(UserProfile {
                daily_quota_remaining: profile.daily_quota_remaining,
                total_used: profile.total_used,
            });
        Ok(())
    }

    async fn consume_quota(&self, user_id: &str) -> Result<Option<i64>, AccountError> {
        let mut profiles = lock(&self.profiles);
        match profiles.get_mut(user_id) {
            Some(profile) if profile.daily_quota_remaining > 0 => {
                profile.daily_quota_remaining -= 1;
                Ok(Some(profile.daily_quota_remaining))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UsageLogStore for MemoryAccounts {
    async fn append(&self, entry: &UsageLogEntry) -> Result<(), AccountError> {
        if let Some(profile) = lock(&self.profiles).get_mut(&entry.user_id) {
            profile.total_used += 1;
        }
        lock(&self.logs).push(entry.clone());
        Ok(())
    }
}
