//! Unix socket listener for IPC.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use meetbook_protocol::{
    Envelope, FRAME_HEADER_LEN, PROTOCOL_VERSION, ProtocolError, Request, Response,
    check_frame_len, decode_header, decode_payload, encode_message,
};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Accepts client connections, at most `max_connections` at a time.
pub struct SocketServer {
    config: ServerConfig,
    listener: UnixListener,
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Binds to the configured socket path.
    ///
    /// A leftover socket file nobody listens on is removed when
    /// `cleanup_stale_socket` is set. A live one is an error.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let socket_path = &config.socket_path;

        if let Some(parent) = socket_path.parent()
            && !parent.exists()
        {
            return Err(ServerError::socket_path_invalid(
                parent.to_string_lossy().to_string(),
            ));
        }

        if socket_path.exists() {
            if !config.cleanup_stale_socket {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            if UnixStream::connect(socket_path).await.is_ok() {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            info!(path = %socket_path.display(), "removing stale socket");
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)?;
        info!(path = %socket_path.display(), "socket server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Waits for a connection slot, then for a client.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self
            .connection_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ServerError::Shutdown)?;

        let (stream, _addr) = self.listener.accept().await?;
        debug!("accepted connection");

        Ok(Connection {
            stream,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Accept loop. Each connection runs on its own task.
    pub async fn run<F, Fut>(&self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handler(connection));
                }
                Err(ServerError::Shutdown) => return Ok(()),
                Err(e) => error!(error = %e, "failed to accept connection"),
            }
        }
    }

    /// Runs the accept loop until `shutdown` completes.
    pub async fn run_until_shutdown<F, Fut, S>(&self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.run(handler) => result,
            _ = shutdown => {
                info!("shutdown signal received");
                Ok(())
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let path = &self.config.socket_path;
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed socket file"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove socket file"),
        }
    }
}

/// One client connection. Holds a connection slot until dropped.
pub struct Connection {
    stream: UnixStream,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    /// Reads the next request.
    ///
    /// Returns `Ok(None)` when the client closed the connection between
    /// messages.
    pub async fn read_request(&mut self) -> ServerResult<Option<Envelope<Request>>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut header)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ProtocolError::timeout("read request length").into()),
        }

        let len = check_frame_len(decode_header(&header))?;

        let mut payload = vec![0u8; len];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut payload)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ProtocolError::timeout("read request payload").into()),
        }

        let envelope: Envelope<Request> = decode_payload(&payload)?;

        if !envelope.is_compatible() {
            warn!(
                version = %envelope.protocol_version,
                expected = %PROTOCOL_VERSION,
                "incompatible protocol version"
            );
        }

        Ok(Some(envelope))
    }

    pub async fn write_response(&mut self, envelope: &Envelope<Response>) -> ServerResult<()> {
        let frame = encode_message(envelope)?;

        match tokio::time::timeout(self.timeout, self.stream.write_all(&frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ProtocolError::timeout("write response").into()),
        }
    }

    /// Sends `response` tagged with `request_id`.
    pub async fn respond(
        &mut self,
        request_id: impl Into<String>,
        response: Response,
    ) -> ServerResult<()> {
        let envelope = Envelope::response(request_id, response);
        self.write_response(&envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetbook_protocol::decode_message;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_and_removes_socket_file() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        assert!(socket_path.exists());
        assert_eq!(server.socket_path(), socket_path.as_path());

        drop(server);
        assert!(!socket_path.exists());
    }

    #[tokio::test]
    async fn rejects_live_socket() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let _server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();

        let result = SocketServer::new(ServerConfig::new(&socket_path)).await;
        assert!(matches!(result, Err(ServerError::SocketInUse { .. })));
    }

    #[tokio::test]
    async fn rejects_existing_file_without_cleanup() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        std::fs::write(&socket_path, b"stale").unwrap();

        let config = ServerConfig::new(&socket_path).with_cleanup_stale_socket(false);
        let result = SocketServer::new(config).await;
        assert!(matches!(result, Err(ServerError::SocketInUse { .. })));
    }

    #[tokio::test]
    async fn cleans_stale_socket() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        std::fs::write(&socket_path, b"stale").unwrap();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        assert!(socket_path.exists());
        drop(server);
    }

    #[tokio::test]
    async fn rejects_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("missing").join("test.sock");

        let result = SocketServer::new(ServerConfig::new(&socket_path)).await;
        assert!(matches!(result, Err(ServerError::SocketPathInvalid { .. })));
    }

    #[tokio::test]
    async fn connection_roundtrip() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let config = ServerConfig::new(&socket_path).with_connection_timeout(Duration::from_secs(5));
        let server = SocketServer::new(config).await.unwrap();

        let client_path = socket_path.clone();
        let client = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();

            let frame = encode_message(&Envelope::request("test-1", Request::Ping)).unwrap();
            stream.write_all(&frame).await.unwrap();

            let mut header = [0u8; FRAME_HEADER_LEN];
            stream.read_exact(&mut header).await.unwrap();
            let len = decode_header(&header) as usize;
            let mut payload = vec![0u8; len];
            stream.read_exact(&mut payload).await.unwrap();

            let mut frame = header.to_vec();
            frame.extend_from_slice(&payload);
            let response: Envelope<Response> = decode_message(&frame).unwrap();
            assert_eq!(response.request_id, "test-1");
            assert_eq!(response.payload, Response::Pong);
        });

        let mut conn = server.accept().await.unwrap();
        let request = conn.read_request().await.unwrap().unwrap();
        assert_eq!(request.payload, Request::Ping);
        conn.respond(&request.request_id, Response::Pong).await.unwrap();

        client.await.unwrap();
    }

    #[tokio::test]
    async fn client_disconnect_reads_as_none() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();

        let client_path = socket_path.clone();
        let client = tokio::spawn(async move {
            let _stream = UnixStream::connect(&client_path).await.unwrap();
        });

        let mut conn = server.accept().await.unwrap();
        client.await.unwrap();

        assert!(conn.read_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_length_frame_is_rejected() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();

        let client_path = socket_path.clone();
        let client = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();
            stream.write_all(&0u32.to_be_bytes()).await.unwrap();
            stream
        });

        let mut conn = server.accept().await.unwrap();
        let result = conn.read_request().await;
        assert!(matches!(
            result,
            Err(ServerError::Protocol(ProtocolError::EmptyMessage))
        ));
        drop(client.await.unwrap());
    }
}
