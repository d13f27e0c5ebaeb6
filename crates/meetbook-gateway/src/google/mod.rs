//! Google Calendar gateway.
//!
//! Reads busy time through the FreeBusy API and books events with a Google
//! Meet conference attached. Authentication uses a refresh token obtained
//! out of band; access tokens are cached in memory only.
//!
//! ```ignore
//! use meetbook_gateway::google::{GoogleConfig, GoogleGateway, OAuthCredentials};
//!
//! let config = GoogleConfig::new(
//!     OAuthCredentials::new("id.apps.googleusercontent.com", "secret"),
//!     refresh_token,
//! )
//! .with_owner_email("host@example.com")
//! .with_timezone("America/Los_Angeles");
//!
//! let gateway = GoogleGateway::new(config)?;
//! ```

mod client;
mod config;
mod gateway;
mod tokens;

pub use client::GoogleCalendarClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use gateway::GoogleGateway;
pub use tokens::{AccessToken, TokenCache};
