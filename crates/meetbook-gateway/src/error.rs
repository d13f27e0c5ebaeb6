//! Error types for calendar gateway operations.

use std::fmt;
use thiserror::Error;

/// The category of a gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorCode {
    /// Credentials are missing, expired or revoked.
    AuthenticationFailed,
    /// Credentials are valid but lack permission on the calendar.
    AuthorizationFailed,
    /// Connection failed, timed out, or DNS resolution failed.
    NetworkError,
    RateLimited,
    /// Non-2xx status not covered by a more specific code.
    ServerError,
    /// Response body could not be parsed.
    InvalidResponse,
    NotFound,
    ConfigurationError,
    InternalError,
}

impl GatewayErrorCode {
    /// Returns true if the calendar refused our credentials.
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::AuthorizationFailed)
    }

    /// Returns true if the operation may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a calendar gateway.
///
/// The message may contain upstream detail and is meant for logs only.
#[derive(Debug, Error)]
pub struct GatewayError {
    code: GatewayErrorCode,
    message: String,
    gateway: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            gateway: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationFailed, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthorizationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ConfigurationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InternalError, message)
    }

    /// Tags the error with the gateway that produced it.
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = Some(gateway.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> GatewayErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn gateway(&self) -> Option<&str> {
        self.gateway.as_deref()
    }

    /// Authentication or authorization failure.
    pub fn is_credential_problem(&self) -> bool {
        self.code.is_credential_problem()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref gateway) = self.gateway {
            write!(f, "[{}] ", gateway)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
