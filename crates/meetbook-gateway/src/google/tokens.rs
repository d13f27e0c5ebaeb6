//! Access token cache backed by a long-lived refresh token.
//!
//! Tokens live only in memory. An access token is reused until one minute
//! before it expires, then a fresh one is requested from the token endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{GatewayError, GatewayResult};

use super::config::OAuthCredentials;

/// Seconds shaved off the advertised lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A short-lived access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in_secs: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: expires_in_secs
                .map(|secs| now + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)),
        }
    }

    /// Tokens without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Classifies a failed token refresh.
///
/// `invalid_grant` and `invalid_client` mean the stored credentials are
/// dead and are authentication failures. Server-side trouble is not.
pub(crate) fn refresh_error(status: u16, body: &str) -> GatewayError {
    let parsed: Option<TokenErrorResponse> = serde_json::from_str(body).ok();

    match parsed {
        Some(err) if matches!(err.error.as_str(), "invalid_grant" | "invalid_client" | "unauthorized_client") => {
            GatewayError::authentication(format!(
                "token refresh rejected: {}{}",
                err.error,
                err.error_description
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default()
            ))
        }
        _ if status == 401 || status == 400 => {
            GatewayError::authentication(format!("token refresh failed ({}): {}", status, body))
        }
        _ if status == 429 => GatewayError::rate_limited("token endpoint rate limited"),
        _ => GatewayError::server(format!("token refresh failed ({}): {}", status, body)),
    }
}

/// Caches the access token and refreshes it on demand.
#[derive(Debug)]
pub struct TokenCache {
    http_client: reqwest::Client,
    credentials: OAuthCredentials,
    refresh_token: String,
    token_url: String,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(
        http_client: reqwest::Client,
        credentials: OAuthCredentials,
        refresh_token: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            credentials,
            refresh_token: refresh_token.into(),
            token_url: token_url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, refreshing if needed.
    ///
    /// The lock is held across the refresh so concurrent callers wait for
    /// one exchange instead of each starting their own.
    pub async fn access_token(&self) -> GatewayResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref()
            && !token.is_expired(now)
        {
            return Ok(token.token.clone());
        }

        debug!("refreshing access token");
        let token = self.refresh(now).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn refresh(&self, now: DateTime<Utc>) -> GatewayResult<AccessToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                GatewayError::network(format!("token refresh request failed: {}", e)).with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(refresh_error(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::invalid_response(format!("invalid token response: {}", e)))?;

        info!(expires_in = ?parsed.expires_in, "refreshed access token");
        Ok(AccessToken::new(parsed.access_token, parsed.expires_in, now))
    }
}
