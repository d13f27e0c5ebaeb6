//! Google Calendar gateway configuration.

use std::time::Duration;

use crate::conference::JoinLinkPoll;

/// OAuth client credentials from the Google Cloud console.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for [`GoogleGateway`](super::GoogleGateway).
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials: OAuthCredentials,
    /// Long-lived refresh token obtained out of band.
    pub refresh_token: String,
    /// Calendar to read busy time from and book into.
    pub calendar_id: String,
    /// Host's email, added as an accepted attendee.
    pub owner_email: String,
    /// IANA zone sent with FreeBusy queries and event times.
    pub timezone: String,
    pub timeout: Duration,
    pub join_link_poll: JoinLinkPoll,
    /// Base URL of the Calendar API.
    pub api_base: String,
    pub token_url: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";
    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    pub fn new(credentials: OAuthCredentials, refresh_token: impl Into<String>) -> Self {
        Self {
            credentials,
            refresh_token: refresh_token.into(),
            calendar_id: "primary".to_string(),
            owner_email: String::new(),
            timezone: "UTC".to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            join_link_poll: JoinLinkPoll::default(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    pub fn with_owner_email(mut self, email: impl Into<String>) -> Self {
        self.owner_email = email.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_join_link_poll(mut self, poll: JoinLinkPoll) -> Self {
        self.join_link_poll = poll;
        self
    }

    /// Points the gateway at a different API host.
    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.token_url = token_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.refresh_token.is_empty() {
            return Err("refresh_token is required".to_string());
        }
        if self.calendar_id.is_empty() {
            return Err("calendar_id is required".to_string());
        }
        if self.owner_email.is_empty() {
            return Err("owner_email is required".to_string());
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
