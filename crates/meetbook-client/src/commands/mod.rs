//! Subcommand implementations.

pub mod book;
pub mod config;
pub mod dates;
pub mod server;
pub mod slots;
pub mod status;
pub mod types;

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use meetbook_protocol::Response;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::socket::SocketClient;

/// Builds a socket client from flags, falling back to `[server]` settings.
pub fn client(cli: &Cli, config: &AppConfig) -> SocketClient {
    let socket_path = cli
        .socket_path
        .clone()
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(meetbook_server::default_socket_path);
    let timeout = cli.timeout.unwrap_or(config.server.timeout);
    SocketClient::new(socket_path, Duration::from_secs(timeout))
}

/// Turns an error response into a [`ClientError::Server`].
pub(crate) fn into_result(response: Response) -> ClientResult<Response> {
    match response {
        Response::Error { error } => Err(error.into()),
        other => Ok(other),
    }
}

pub(crate) fn unexpected(response: &Response) -> ClientError {
    ClientError::Protocol(format!("unexpected response: {:?}", response))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> ClientResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Protocol(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Parses an optional IANA name, defaulting to UTC.
pub(crate) fn display_timezone(name: Option<&str>) -> ClientResult<Tz> {
    match name {
        Some(name) => name
            .parse()
            .map_err(|_| ClientError::Input(format!("unknown timezone: {}", name))),
        None => Ok(Tz::UTC),
    }
}

/// `09:15` style local time.
pub(crate) fn local_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}
