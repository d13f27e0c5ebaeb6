//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("calendar error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Could not reach the daemon.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The daemon answered with an error response.
    #[error("{0}")]
    Server(String),

    /// Bad command-line input.
    #[error("invalid input: {0}")]
    Input(String),
}

impl From<meetbook_protocol::ProtocolError> for ClientError {
    fn from(err: meetbook_protocol::ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<meetbook_gateway::GatewayError> for ClientError {
    fn from(err: meetbook_gateway::GatewayError) -> Self {
        Self::Gateway(err.to_string())
    }
}

impl From<meetbook_protocol::ErrorResponse> for ClientError {
    fn from(err: meetbook_protocol::ErrorResponse) -> Self {
        Self::Server(err.message)
    }
}
