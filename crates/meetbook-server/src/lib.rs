//! Daemon: validation, slot queries, booking reconciliation, socket IPC.
//!
//! The server answers slot queries and booking submissions for one
//! [`SiteConfig`](meetbook_core::SiteConfig) against one
//! [`CalendarGateway`](meetbook_gateway::CalendarGateway), over a Unix socket.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use meetbook_core::SiteConfig;
//! use meetbook_gateway::MemoryGateway;
//! use meetbook_server::{
//!     RequestHandler, ServerConfig, SignalHandler, SocketServer, make_connection_handler,
//!     new_shared_state,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let site = Arc::new(SiteConfig::new(chrono_tz::Europe::Paris));
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!
//!     let handler = RequestHandler::new(site, Arc::new(MemoryGateway::new()), new_shared_state())
//!         .with_shutdown(signals.shutdown_handle());
//!
//!     let server = SocketServer::new(ServerConfig::default()).await?;
//!     server
//!         .run_until_shutdown(make_connection_handler(handler), signals.shutdown().wait())
//!         .await?;
//!     Ok(())
//! }
//! ```

mod booking;
mod config;
mod error;
mod handler;
mod signals;
mod slots;
mod socket;
mod validate;

pub use booking::{BookingReconciler, Confirmation, event_description};
pub use config::{ServerConfig, default_socket_path};
pub use error::{EngineError, ServerError, ServerResult};
pub use handler::{
    Clock, MAX_DATE_RANGE_DAYS, RequestHandler, ServerState, SharedState, make_connection_handler,
    new_shared_state,
};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use slots::SlotService;
pub use socket::{Connection, SocketServer};
pub use validate::{
    ValidBooking, ValidSlotQuery, is_valid_email, parse_date, validate_booking, validate_slot_query,
};
