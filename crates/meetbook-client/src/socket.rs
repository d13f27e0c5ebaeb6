//! Unix socket client for the meetbook daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use meetbook_protocol::{
    Envelope, FRAME_HEADER_LEN, Request, Response, check_frame_len, decode_header, decode_payload,
    encode_message,
};

use crate::error::{ClientError, ClientResult};

/// Sends one request per connection to the daemon.
pub struct SocketClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(meetbook_server::default_socket_path(), Duration::from_secs(5))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Sends a request and waits for the response.
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(&request_id, request);

        debug!(
            socket = %self.socket_path.display(),
            request_id = %request_id,
            "connecting to daemon"
        );

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| {
                ClientError::Connection(format!(
                    "connection timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ClientError::Connection(format!(
                    "failed to connect to {}: {} (is `meetbook server` running?)",
                    self.socket_path.display(),
                    e
                ))
            })?;

        let response = self.exchange(stream, &envelope).await?;

        if response.request_id != request_id {
            warn!(
                expected = %request_id,
                received = %response.request_id,
                "response request_id mismatch"
            );
        }

        Ok(response.payload)
    }

    async fn exchange(
        &self,
        mut stream: UnixStream,
        envelope: &Envelope<Request>,
    ) -> ClientResult<Envelope<Response>> {
        let frame = encode_message(envelope)?;

        tokio::time::timeout(self.timeout, async {
            stream.write_all(&frame).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| ClientError::Timeout("sending request".into()))??;

        debug!("request sent, waiting for response");

        let payload = tokio::time::timeout(self.timeout, async {
            let mut header = [0u8; FRAME_HEADER_LEN];
            stream.read_exact(&mut header).await?;
            let len = check_frame_len(decode_header(&header))?;

            let mut payload = vec![0u8; len];
            stream.read_exact(&mut payload).await?;
            Ok::<_, ClientError>(payload)
        })
        .await
        .map_err(|_| ClientError::Timeout("reading response".into()))??;

        let envelope: Envelope<Response> = decode_payload(&payload)?;
        debug!(request_id = %envelope.request_id, "response received");
        Ok(envelope)
    }

    /// True if the daemon answers a ping.
    pub async fn ping(&self) -> bool {
        matches!(self.send(Request::Ping).await, Ok(Response::Pong))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use meetbook_core::SiteConfig;
    use meetbook_gateway::MemoryGateway;
    use meetbook_server::{
        RequestHandler, ServerConfig, SocketServer, make_connection_handler, new_shared_state,
    };

    #[test]
    fn creation() {
        let client = SocketClient::new("/tmp/test.sock", Duration::from_secs(10));
        assert_eq!(client.socket_path(), Path::new("/tmp/test.sock"));
        assert!(!client.socket_exists());
    }

    #[test]
    fn default_client() {
        let client = SocketClient::with_defaults();
        assert!(client.socket_path().to_string_lossy().contains("meetbook"));
    }

    #[tokio::test]
    async fn missing_socket_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = SocketClient::new(dir.path().join("none.sock"), Duration::from_secs(1));

        assert!(!client.ping().await);
        let err = client.send(Request::Ping).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[tokio::test]
    async fn talks_to_a_running_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("meetbook.sock");

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        let handler = RequestHandler::new(
            Arc::new(SiteConfig::new(chrono_tz::UTC)),
            Arc::new(MemoryGateway::new()),
            new_shared_state(),
        );
        tokio::spawn(async move { server.run(make_connection_handler(handler)).await });

        let client = SocketClient::new(&socket_path, Duration::from_secs(5));
        assert!(client.ping().await);

        match client.send(Request::Status).await.unwrap() {
            Response::Status { info } => assert_eq!(info.gateway, "memory"),
            other => panic!("expected status, got {other:?}"),
        }
    }
}
