use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Credentials;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// OAuth2 token endpoint (podio.com handles login)
const TOKEN_URL: &str = "https://podio.com/oauth/token";

/// Base URL for data endpoints
const API_BASE_URL: &str = "https://api.podio.com";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size for the paginated member fetch. Podio's filter endpoint caps
/// small apps comfortably at 30 items per batch.
const MEMBER_PAGE_SIZE: usize = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FilterResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// The two fetch operations the pipeline needs from the remote service.
/// Kept narrow so tests run against a stub instead of the network.
#[allow(async_fn_in_trait)] // single-threaded pipeline, no Send bound needed
pub trait MemberSource {
    /// Fetch the full member list as a raw JSON array.
    async fn fetch_members(&self) -> Result<Value>;

    /// Fetch the revision history for one item as a raw JSON array.
    async fn fetch_revisions(&self, item_id: i64) -> Result<Value>;
}

/// API client for Podio.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PodioClient {
    client: Client,
    token: String,
    app_id: String,
}

impl PodioClient {
    /// Authenticate with the OAuth2 password grant and return a ready client.
    /// A rejected credential set is fatal.
    pub async fn authenticate(credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let response = client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "password"),
                ("client_id", &credentials.client_id),
                ("client_secret", &credentials.client_secret),
                ("username", &credentials.username),
                ("password", &credentials.password),
            ])
            .send()
            .await
            .context("Failed to send authentication request")?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::AuthenticationFailed(body).into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        info!("Authentication successful");

        Ok(Self {
            client,
            token: token.access_token,
            app_id: credentials.app_id.clone(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}

impl MemberSource for PodioClient {
    /// Fetch all member items from the app via the paginated filter endpoint.
    /// Any failed batch aborts the run - a truncated roster would silently
    /// misreport the monthly counts.
    async fn fetch_members(&self) -> Result<Value> {
        let url = format!("{}/item/app/{}/filter", API_BASE_URL, self.app_id);
        let mut items: Vec<Value> = Vec::new();
        let mut offset = 0usize;

        loop {
            debug!(offset, "Fetching member batch");
            let body = serde_json::json!({
                "limit": MEMBER_PAGE_SIZE,
                "offset": offset,
            });

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Failed to fetch member batch at offset {}", offset))?;

            let response = Self::check_response(response).await?;
            let batch: FilterResponse = response
                .json()
                .await
                .context("Failed to parse member filter response")?;

            let batch_len = batch.items.len();
            items.extend(batch.items);
            offset += batch_len;

            if batch_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        info!(count = items.len(), "Fetched member list");
        Ok(Value::Array(items))
    }

    async fn fetch_revisions(&self, item_id: i64) -> Result<Value> {
        let url = format!("{}/item/{}/revision", API_BASE_URL, item_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to fetch revisions for item {}", item_id))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse revisions for item {}", item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"access_token":"abc123","token_type":"bearer","expires_in":28800,"refresh_token":"r1"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "abc123");
    }

    #[test]
    fn test_parse_filter_response() {
        let json = r#"{"total":2,"filtered":2,"items":[{"item_id":1},{"item_id":2}]}"#;
        let resp: FilterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 2);

        // Missing items field defaults to empty
        let resp: FilterResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(resp.items.is_empty());
    }
}
