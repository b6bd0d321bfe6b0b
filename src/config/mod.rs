pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use convertlink_common::Error;
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./convertlink.toml", "~/.config/convertlink/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> convertlink_common::Result<()> {
    let url = config.broker.url.trim();
    if url.is_empty() {
        return Err(Error::config("Broker URL cannot be empty"));
    }
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        return Err(Error::config(format!(
            "Broker URL must use ws:// or wss://, got '{}'",
            url
        )));
    }

    if config.broker.reconnect_delay_ms == 0 {
        tracing::warn!("Reconnect delay is 0: dropped sessions will not be retried");
    }

    let mut seen = HashSet::new();
    for (queue, destination) in config.destinations.iter() {
        if destination.is_empty() {
            return Err(Error::config(format!(
                "Destination for queue '{}' cannot be empty",
                queue
            )));
        }
        if !destination.starts_with('/') {
            return Err(Error::config(format!(
                "Destination for queue '{}' must start with '/', got '{}'",
                queue, destination
            )));
        }
        if !seen.insert(destination) {
            return Err(Error::config(format!(
                "Destination '{}' is used by more than one queue",
                destination
            )));
        }
    }

    Ok(())
}
