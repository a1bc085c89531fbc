//! Configuration file handling.
//!
//! Reads from `~/.config/pindrop/pindrop.toml`

use anyhow::{Context, Result};
use pindrop_core::geocode::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use pindrop_core::viewport::{DEFAULT_CENTER, DEFAULT_ZOOM};
use pindrop_core::{Coordinate, Viewport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where saved pins live. Defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    /// Reverse geocoding endpoint.
    #[serde(default = "default_geocoder_endpoint")]
    pub geocoder_endpoint: String,
    /// Client label sent with every lookup.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Map center on startup.
    #[serde(default = "default_initial_lat")]
    pub initial_lat: f64,
    #[serde(default = "default_initial_lng")]
    pub initial_lng: f64,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    /// Share of the screen given to the pin list.
    #[serde(default = "default_sidebar_width_percent")]
    pub sidebar_width_percent: u16,
}

fn default_geocoder_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_initial_lat() -> f64 {
    DEFAULT_CENTER.lat
}

fn default_initial_lng() -> f64 {
    DEFAULT_CENTER.lng
}

fn default_initial_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_sidebar_width_percent() -> u16 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: None,
            geocoder_endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            initial_lat: default_initial_lat(),
            initial_lng: default_initial_lng(),
            initial_zoom: default_initial_zoom(),
            sidebar_width_percent: default_sidebar_width_percent(),
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path.
    /// Otherwise, load from the default XDG config location.
    /// Creates a default config file if it doesn't exist (only for default path).
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        let is_custom = custom_path.is_some();
        let config_path = match custom_path {
            Some(path) => path,
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            if !is_custom {
                let config = Config::default();
                config.save()?;
                tracing::info!("Created default config at {}", config_path.display());
                return Ok(config);
            } else {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded config from {}: {:?}", config_path.display(), config);
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Coordinate::new(config.initial_lat, config.initial_lng)?;
        if !(10..=90).contains(&config.sidebar_width_percent) {
            anyhow::bail!(
                "sidebar_width_percent must be between 10 and 90, got {}",
                config.sidebar_width_percent
            );
        }
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))
    }

    /// Initial map view.
    pub fn viewport(&self) -> Viewport {
        let center = Coordinate::new(self.initial_lat, self.initial_lng).unwrap_or(DEFAULT_CENTER);
        Viewport::new(center, self.initial_zoom)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("pindrop").join("pindrop.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            storage_path = "/tmp/pins.json"
            initial_zoom = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/pins.json")));
        assert_eq!(config.viewport().zoom, 5);
        assert_eq!(config.user_agent, "PinDropApp/1.0");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::parse("initial_lat = 120.0").is_err());
        assert!(Config::parse("sidebar_width_percent = 0").is_err());
        assert!(Config::parse("initial_zoom = \"far\"").is_err());
    }

    #[test]
    fn test_missing_custom_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pindrop.toml");
        std::fs::write(&path, "sidebar_width_percent = 40\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.sidebar_width_percent, 40);
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }
}
