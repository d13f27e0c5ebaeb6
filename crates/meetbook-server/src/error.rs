//! Server error types.

use std::io;

use meetbook_gateway::GatewayError;
use thiserror::Error;

/// Result type for daemon plumbing.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors from the socket server and daemon lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] meetbook_protocol::ProtocolError),

    #[error("Socket path already in use: {path}")]
    SocketInUse { path: String },

    #[error("Socket path parent directory does not exist: {path}")]
    SocketPathInvalid { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Server shutdown requested")]
    Shutdown,
}

impl ServerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn socket_in_use(path: impl Into<String>) -> Self {
        Self::SocketInUse { path: path.into() }
    }

    pub fn socket_path_invalid(path: impl Into<String>) -> Self {
        Self::SocketPathInvalid { path: path.into() }
    }
}

/// Outcome classes of a slot query or booking that did not succeed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input rejected before any calendar call. The message is guest-facing.
    #[error("{0}")]
    Validation(String),

    /// The slot was taken after it was offered.
    #[error("slot is no longer available")]
    Conflict,

    /// The calendar refused our credentials.
    #[error("calendar credentials rejected: {0}")]
    GatewayAuth(#[source] GatewayError),

    /// Any other calendar failure.
    #[error("calendar request failed: {0}")]
    GatewayTransient(#[source] GatewayError),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<GatewayError> for EngineError {
    fn from(err: GatewayError) -> Self {
        if err.is_credential_problem() {
            Self::GatewayAuth(err)
        } else {
            Self::GatewayTransient(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_become_gateway_auth() {
        let err: EngineError = GatewayError::authentication("invalid_grant").into();
        assert!(matches!(err, EngineError::GatewayAuth(_)));

        let err: EngineError = GatewayError::authorization("forbidden").into();
        assert!(matches!(err, EngineError::GatewayAuth(_)));
    }

    #[test]
    fn other_errors_become_transient() {
        let err: EngineError = GatewayError::rate_limited("slow down").into();
        assert!(matches!(err, EngineError::GatewayTransient(_)));

        let err: EngineError = GatewayError::network("reset").into();
        assert!(matches!(err, EngineError::GatewayTransient(_)));
    }

    #[test]
    fn validation_message_is_display() {
        let err = EngineError::validation("Please enter your name");
        assert_eq!(err.to_string(), "Please enter your name");
    }
}
