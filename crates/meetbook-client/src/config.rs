//! Application configuration.
//!
//! All settings live in a single `config.toml`, by default at
//! `~/.config/meetbook/config.toml`:
//!
//! ```toml
//! [site]
//! timezone = "America/Los_Angeles"
//! max_booking_days = 30
//!
//! [site.owner]
//! name = "Ada"
//! booking_url = "https://book.example.com"
//!
//! [site.availability.monday]
//! start = "09:00"
//! end = "17:00"
//!
//! [[site.meeting_types]]
//! slug = "30"
//! title = "30 minute call"
//! duration = 30
//! buffer_minutes = 15
//! min_notice_hours = 4
//!
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! client_secret = "pass::google/meetbook"
//! refresh_token = "env::GOOGLE_REFRESH_TOKEN"
//! owner_email = "ada@example.com"
//!
//! [server]
//! timeout = 5
//! ```
//!
//! Credential values support secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};

use meetbook_core::SiteConfig;
use serde::{Deserialize, Serialize};

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host availability and meeting types. Required to run the daemon.
    pub site: Option<SiteConfig>,

    /// Google Calendar settings.
    pub google: Option<GoogleSettings>,

    pub server: ServerSettings,
}

/// Socket settings shared by the daemon and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub socket_path: Option<PathBuf>,

    /// Client request timeout in seconds.
    pub timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: 5,
        }
    }
}

/// Google Calendar settings.
///
/// `client_id`, `client_secret` and `refresh_token` accept `pass::` and
/// `env::` references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub calendar_id: String,
    /// The host's address, added to every event as an accepted attendee.
    pub owner_email: Option<String>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            calendar_id: "primary".to_string(),
            owner_email: None,
        }
    }
}

impl AppConfig {
    /// Loads the default file, or defaults if it does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetbook")
    }

    /// The `[site]` section, validated.
    pub fn site(&self) -> Result<&SiteConfig, String> {
        let site = self.site.as_ref().ok_or_else(|| {
            format!(
                "no [site] section in {}; add a timezone, availability and meeting types",
                Self::default_path().display()
            )
        })?;
        site.validate().map_err(|e| e.to_string())?;
        Ok(site)
    }
}

#[cfg(feature = "google")]
impl GoogleSettings {
    /// Resolves secrets and builds the gateway configuration.
    pub fn to_gateway_config(
        &self,
        timezone: &str,
    ) -> Result<meetbook_gateway::google::GoogleConfig, String> {
        use meetbook_gateway::google::GoogleConfig;

        let credentials = self.resolve_credentials()?;
        credentials.validate().map_err(|e| e.to_string())?;

        let refresh_token = resolve_field("refresh_token", self.refresh_token.as_deref())?;
        let owner_email = self
            .owner_email
            .as_deref()
            .ok_or_else(|| "owner_email is missing from [google] section".to_string())?;

        let config = GoogleConfig::new(credentials, refresh_token)
            .with_calendar_id(&self.calendar_id)
            .with_owner_email(owner_email)
            .with_timezone(timezone);
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn resolve_credentials(
        &self,
    ) -> Result<meetbook_gateway::google::OAuthCredentials, String> {
        use meetbook_gateway::google::OAuthCredentials;

        let client_id = resolve_field("client_id", self.client_id.as_deref())?;
        let client_secret = resolve_field("client_secret", self.client_secret.as_deref())?;
        Ok(OAuthCredentials::new(client_id, client_secret))
    }
}

#[cfg(feature = "google")]
fn resolve_field(name: &str, value: Option<&str>) -> Result<String, String> {
    let raw = value.ok_or_else(|| format!("{} is missing from [google] section", name))?;
    crate::secret::resolve(raw).map_err(|e| format!("failed to resolve {}: {}", name, e))
}
