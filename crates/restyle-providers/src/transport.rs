//! Shared HTTP plumbing: client construction and status/body classification.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::ProviderError;

/// Build a connection-pooled client with the request timeout applied.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

/// Send a prepared request and decode a successful JSON body into `T`.
///
/// Non-success statuses are classified via [`ProviderError::from_status`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| {
        error!(provider = %provider, error = %e, "HTTP request failed");
        ProviderError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider = %provider, status = %status, body = %body, "API error");
        return Err(ProviderError::from_status(status.as_u16(), &body));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        error!(provider = %provider, error = %e, "Failed to parse provider response");
        ProviderError::Parse(e.to_string())
    })
}

/// Keep only text that has something other than whitespace in it.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
