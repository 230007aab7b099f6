//! Supabase-backed accounts: GoTrue for identity, PostgREST for the
//! `profiles` and `usage_logs` tables.
//!
//! Every request carries the service-role key both as `apikey` and, for
//! table access, as the bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use restyle_core::utils::{short_id, timestamp};
use restyle_core::{Identity, NewProfile, UsageLogEntry, UserProfile};

use crate::error::AccountError;
use crate::ports::{IdentityProvider, ProfileStore, UsageLogStore};

/// Timeout for identity and table requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Compare-and-swap attempts before a quota decrement gives up.
const MAX_CAS_ATTEMPTS: usize = 3;

const PROFILE_COLUMNS: &str = "daily_quota_remaining,total_used";

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AccountError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AccountError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A table request authenticated with the service key.
    fn table(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(&format!("/rest/v1/{table}")))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AccountError> {
        let response = request.send().await.map_err(|e| AccountError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AccountError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, AccountError> {
        response.json().await.map_err(|e| AccountError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AccountError> {
        let endpoint = "auth/v1/user";
        let request = self
            .client
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.service_key)
            .bearer_auth(token);

        match self.send(endpoint, request).await {
            Ok(response) => Ok(Some(Self::decode(endpoint, response).await?)),
            Err(AccountError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                debug!(status, "identity service rejected token");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AccountError> {
        let request = self
            .table(reqwest::Method::GET, "profiles")
            .query(&[("id", format!("eq.{user_id}")), ("select", PROFILE_COLUMNS.to_string())]);

        let response = self.send("profiles", request).await?;
        let rows: Vec<UserProfile> = Self::decode("profiles", response).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), AccountError> {
        let request = self
            .table(reqwest::Method::POST, "profiles")
            .header("Prefer", "resolution=merge-duplicates")
            .json(profile);

        self.send("profiles", request).await?;
        debug!(user = short_id(&profile.id), "profile created");
        Ok(())
    }

    async fn consume_quota(&self, user_id: &str) -> Result<Option<i64>, AccountError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let Some(profile) = self.fetch_profile(user_id).await? else {
                return Ok(None);
            };
            let current = profile.daily_quota_remaining;
            if current <= 0 {
                return Ok(None);
            }

            // Only applies if nobody changed the counter since we read it.
            let request = self
                .table(reqwest::Method::PATCH, "profiles")
                .query(&[
                    ("id", format!("eq.{user_id}")),
                    ("daily_quota_remaining", format!("eq.{current}")),
                    ("select", PROFILE_COLUMNS.to_string()),
                ])
                .header("Prefer", "return=representation")
                .json(&json!({
                    "daily_quota_remaining": current - 1,
                    "updated_at": timestamp(),
                }));

            let response = self.send("profiles", request).await?;
            let updated: Vec<UserProfile> = Self::decode("profiles", response).await?;
            if let Some(row) = updated.into_iter().next() {
                return Ok(Some(row.daily_quota_remaining));
            }

            warn!(user = short_id(user_id), attempt, "quota changed concurrently, retrying decrement");
        }

        Err(AccountError::Contention {
            user: short_id(user_id).to_string(),
        })
    }
}

#[async_trait]
impl UsageLogStore for SupabaseClient {
    async fn append(&self, entry: &UsageLogEntry) -> Result<(), AccountError> {
        let request = self
            .table(reqwest::Method::POST, "usage_logs")
            .header("Prefer", "return=minimal")
            .json(entry);

        self.send("usage_logs", request).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&server.uri(), "service-key").unwrap()
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "8f14e45f-ceea-467f-a9f0-5c1a2b3c4d5e",
                "email": "amy@example.com",
                "aud": "authenticated"
            })))
            .mount(&server)
            .await;

        let identity = client(&server).await.verify("user-jwt").await.unwrap().unwrap();
        assert_eq!(identity.id, "8f14e45f-ceea-467f-a9f0-5c1a2b3c4d5e");
        assert_eq!(identity.email.as_deref(), Some("amy@example.com"));
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "msg": "invalid JWT"
            })))
            .mount(&server)
            .await;

        assert!(client(&server).await.verify("expired").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_service_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).await.verify("tok").await.unwrap_err();
        assert!(matches!(err, AccountError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_profile_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(query_param("select", PROFILE_COLUMNS))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": 3, "total_used": 12 }
            ])))
            .mount(&server)
            .await;

        let profile = client(&server).await.fetch_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.daily_quota_remaining, 3);
        assert_eq!(profile.total_used, 12);
    }

    #[tokio::test]
    async fn test_fetch_profile_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(client(&server).await.fetch_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_profile_null_columns_read_as_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": null, "total_used": null }
            ])))
            .mount(&server)
            .await;

        let profile = client(&server).await.fetch_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.daily_quota_remaining, 0);
        assert_eq!(profile.total_used, 0);
    }

    #[tokio::test]
    async fn test_create_profile_upserts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .and(body_partial_json(json!({
                "id": "u1",
                "daily_quota_remaining": 5,
                "role": "user"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let profile = NewProfile::for_identity(&Identity::new("u1", Some("a@b.c")), 5);
        client(&server).await.create_profile(&profile).await.unwrap();
    }

    #[tokio::test]
    async fn test_consume_quota_conditional_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": 2, "total_used": 0 }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(query_param("daily_quota_remaining", "eq.2"))
            .and(body_partial_json(json!({ "daily_quota_remaining": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": 1, "total_used": 0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let remaining = client(&server).await.consume_quota("u1").await.unwrap();
        assert_eq!(remaining, Some(1));
    }

    #[tokio::test]
    async fn test_consume_quota_nothing_left() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": 0, "total_used": 5 }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(client(&server).await.consume_quota("u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_consume_quota_gives_up_under_contention() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "daily_quota_remaining": 4, "total_used": 0 }
            ])))
            .mount(&server)
            .await;
        // Conditional update never matches a row.
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(MAX_CAS_ATTEMPTS as u64)
            .mount(&server)
            .await;

        let err = client(&server).await.consume_quota("u1").await.unwrap_err();
        assert!(matches!(err, AccountError::Contention { .. }));
    }

    #[tokio::test]
    async fn test_append_usage_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/usage_logs"))
            .and(body_partial_json(json!({
                "user_id": "u1",
                "metadata": { "style": "trendy", "model": "deepseek-chat" }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let entry = UsageLogEntry::new("u1", "in", "out", "trendy", "deepseek-chat", 5000, 10000);
        client(&server).await.append(&entry).await.unwrap();
    }

    #[tokio::test]
    async fn test_append_failure_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/usage_logs"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
            .mount(&server)
            .await;

        let entry = UsageLogEntry::new("u1", "in", "out", "trendy", "m", 5000, 10000);
        let err = client(&server).await.append(&entry).await.unwrap_err();
        assert!(err.to_string().contains("409"));
    }
}
