//! Configuration commands.

use std::path::Path;

use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &AppConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", AppConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &AppConfig) -> ClientResult<()> {
    let site = config.site().map_err(ClientError::Config)?;
    println!(
        "Site is valid: {} meeting types, timezone {}.",
        site.meeting_types.len(),
        site.timezone.name()
    );

    #[cfg(feature = "google")]
    if let Some(ref google) = config.google {
        google
            .to_gateway_config(site.timezone.name())
            .map_err(|e| ClientError::Config(format!("invalid Google configuration: {}", e)))?;
        println!("Google settings are valid.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(explicit: Option<&Path>) -> ClientResult<()> {
    match explicit {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: {}", AppConfig::default_path().display()),
    }
    Ok(())
}
