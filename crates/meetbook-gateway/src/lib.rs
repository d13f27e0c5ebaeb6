//! CalendarGateway trait and implementations.
//!
//! - [`CalendarGateway`]: busy-period queries and event creation
//! - [`GatewayError`]: error taxonomy, with credential failures kept apart
//! - [`JoinLinkPoll`]: bounded wait for a conference join link
//! - [`MemoryGateway`]: in-process calendar for development and tests
//! - [`google::GoogleGateway`]: Google Calendar (feature `google`)

pub mod conference;
pub mod error;
pub mod gateway;
#[cfg(feature = "google")]
pub mod google;
pub mod memory;

pub use conference::JoinLinkPoll;
pub use error::{GatewayError, GatewayErrorCode, GatewayResult};
pub use gateway::{BoxFuture, CalendarGateway, CreatedEvent, ErrorGateway, NewEvent};
pub use memory::{MemoryGateway, StoredEvent};
