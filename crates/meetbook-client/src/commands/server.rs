//! Server command: runs the daemon in the foreground.
//!
//! Wires the site configuration, a calendar gateway, the signal handler and
//! the socket server together, then blocks until SIGTERM/SIGINT or a
//! `Shutdown` request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use meetbook_core::SiteConfig;
use meetbook_gateway::{CalendarGateway, ErrorGateway, GatewayError, MemoryGateway};
use meetbook_server::{
    RequestHandler, ServerConfig, SignalHandler, SocketServer, make_connection_handler,
    new_shared_state,
};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

/// Per-connection timeout. Bookings may wait on a join link, so this is
/// well above the client default.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Starts the daemon and blocks until shutdown.
pub async fn run(cli: &Cli, config: &AppConfig, memory: bool) -> ClientResult<()> {
    let site = Arc::new(config.site().map_err(ClientError::Config)?.clone());
    let gateway = build_gateway(config, &site, memory)?;

    info!(
        gateway = gateway.name(),
        timezone = site.timezone.name(),
        meeting_types = site.meeting_types.len(),
        "starting server"
    );

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    let socket_path = cli
        .socket_path
        .clone()
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(meetbook_server::default_socket_path);

    let server_config = ServerConfig::new(&socket_path).with_connection_timeout(CONNECTION_TIMEOUT);
    let server = SocketServer::new(server_config)
        .await
        .map_err(|e| ClientError::Config(format!("failed to start socket server: {}", e)))?;

    info!(path = %socket_path.display(), "server listening");

    let handler = RequestHandler::new(site, gateway, new_shared_state())
        .with_shutdown(signal_handler.shutdown_handle());

    server
        .run_until_shutdown(make_connection_handler(handler), signal_handler.shutdown().wait())
        .await
        .map_err(|e| ClientError::Config(format!("server error: {}", e)))?;

    info!("server stopped");
    Ok(())
}

/// Picks the calendar gateway.
///
/// Without usable Google settings the daemon still starts, but every
/// calendar call fails as a credential problem so guests see the service
/// as unavailable rather than an empty calendar.
fn build_gateway(
    config: &AppConfig,
    site: &SiteConfig,
    memory: bool,
) -> ClientResult<Arc<dyn CalendarGateway>> {
    if memory {
        info!("using in-memory calendar");
        return Ok(Arc::new(MemoryGateway::new()));
    }

    #[cfg(feature = "google")]
    if let Some(ref google) = config.google {
        let google_config = google
            .to_gateway_config(site.timezone.name())
            .map_err(|e| ClientError::Config(format!("invalid Google configuration: {}", e)))?;
        let gateway = meetbook_gateway::google::GoogleGateway::new(google_config)?;
        return Ok(Arc::new(gateway));
    }

    #[cfg(not(feature = "google"))]
    let _ = (config, site);

    warn!("no calendar credentials configured; slot queries and bookings will be refused");
    Ok(Arc::new(ErrorGateway::new(
        "unconfigured",
        GatewayError::authentication("no calendar credentials configured"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_flag_wins() {
        let config = AppConfig::default();
        let site = SiteConfig::new(chrono_tz::UTC);
        let gateway = build_gateway(&config, &site, true).unwrap();
        assert_eq!(gateway.name(), "memory");
    }

    #[test]
    fn missing_credentials_yield_refusing_gateway() {
        let config = AppConfig::default();
        let site = SiteConfig::new(chrono_tz::UTC);
        let gateway = build_gateway(&config, &site, false).unwrap();
        assert_eq!(gateway.name(), "unconfigured");
    }

    #[cfg(feature = "google")]
    #[test]
    fn incomplete_google_section_is_a_config_error() {
        let config = AppConfig::from_toml_str("[google]\nclient_id = \"id\"\n").unwrap();
        let site = SiteConfig::new(chrono_tz::UTC);
        let err = build_gateway(&config, &site, false).err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
