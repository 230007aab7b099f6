//! Test doubles for the pipeline and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use restyle_accounts::{AccountError, IdentityProvider, MemoryAccounts, ProfileStore, UsageLogStore};
use restyle_core::{Identity, NewProfile, UsageLogEntry, UserProfile};
use restyle_providers::{ProviderError, TextGenerator};

enum Script {
    Text(String),
    Empty,
    Fail(fn() -> ProviderError),
}

/// Generator that replays a fixed outcome and counts calls.
pub struct StubGenerator {
    script: Script,
    configured: bool,
    calls: AtomicUsize,
    last_style: Mutex<Option<String>>,
}

impl StubGenerator {
    fn build(script: Script, configured: bool) -> Arc<Self> {
        Arc::new(Self {
            script,
            configured,
            calls: AtomicUsize::new(0),
            last_style: Mutex::new(None),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::build(Script::Text(text.to_string()), true)
    }

    pub fn empty() -> Arc<Self> {
        Self::build(Script::Empty, true)
    }

    pub fn failing(make: fn() -> ProviderError) -> Arc<Self> {
        Self::build(Script::Fail(make), true)
    }

    pub fn unconfigured() -> Arc<Self> {
        Self::build(Script::Text("unused".into()), false)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_style(&self) -> Option<String> {
        self.last_style.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _text: &str, style: &str) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_style.lock().unwrap() = Some(style.to_string());
        match &self.script {
            Script::Text(text) => Ok(Some(text.clone())),
            Script::Empty => Ok(None),
            Script::Fail(make) => Err(make()),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn env_key(&self) -> &str {
        "STUB_API_KEY"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn display_name(&self) -> &str {
        "Stub"
    }
}

/// Wraps [`MemoryAccounts`] and fails selected operations.
pub struct FlakyAccounts {
    inner: Arc<MemoryAccounts>,
    fail_verify: bool,
    fail_fetch: bool,
    fail_create: bool,
    fail_consume: bool,
    fail_append: bool,
    drain_before_consume: bool,
}

fn injected(endpoint: &str) -> AccountError {
    AccountError::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        body: "injected failure".to_string(),
    }
}

impl FlakyAccounts {
    pub fn new(inner: Arc<MemoryAccounts>) -> Self {
        Self {
            inner,
            fail_verify: false,
            fail_fetch: false,
            fail_create: false,
            fail_consume: false,
            fail_append: false,
            drain_before_consume: false,
        }
    }

    pub fn fail_verify(mut self) -> Self {
        self.fail_verify = true;
        self
    }

    pub fn fail_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn fail_consume(mut self) -> Self {
        self.fail_consume = true;
        self
    }

    pub fn fail_append(mut self) -> Self {
        self.fail_append = true;
        self
    }

    /// Simulate a concurrent request spending the last quota between the
    /// pre-call check and the decrement.
    pub fn drain_before_consume(mut self) -> Self {
        self.drain_before_consume = true;
        self
    }
}

#[async_trait]
impl IdentityProvider for FlakyAccounts {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AccountError> {
        if self.fail_verify {
            return Err(injected("auth/v1/user"));
        }
        self.inner.verify(token).await
    }
}

#[async_trait]
impl ProfileStore for FlakyAccounts {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AccountError> {
        if self.fail_fetch {
            return Err(injected("profiles"));
        }
        self.inner.fetch_profile(user_id).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), AccountError> {
        if self.fail_create {
            return Err(injected("profiles"));
        }
        self.inner.create_profile(profile).await
    }

    async fn consume_quota(&self, user_id: &str) -> Result<Option<i64>, AccountError> {
        if self.fail_consume {
            return Err(injected("profiles"));
        }
        if self.drain_before_consume {
            while self.inner.consume_quota(user_id).await?.is_some() {}
        }
        self.inner.consume_quota(user_id).await
    }
}

#[async_trait]
impl UsageLogStore for FlakyAccounts {
    async fn append(&self, entry: &UsageLogEntry) -> Result<(), AccountError> {
        if self.fail_append {
            return Err(injected("usage_logs"));
        }
        self.inner.append(entry).await
    }
}
