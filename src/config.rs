use crate::location::{LocationSource, PermissionPolicy};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable that takes precedence over `api.api_key`.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub location: LocationConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>, // Transport default when unset
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub permission: PermissionPolicy,
    pub source: LocationSource,
    pub lookup_ip: String, // Empty means "whoever is asking"
    pub manual_lat: f64,   // Used when source = "manual"
    pub manual_lon: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    pub notice_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            permission: PermissionPolicy::Ask,
            source: LocationSource::Ip,
            lookup_ip: String::new(),
            manual_lat: 37.7749,
            manual_lon: -122.4194,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 150,
            notice_seconds: 6,
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, writes a default one for the user to edit.
    /// The API key environment variable is applied last.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_PATH);
        let config = match Self::load_from(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = Config::default();
                if let Err(e) = config.save_to(path) {
                    warn!("Could not write default {}: {}", CONFIG_PATH, e);
                }
                info!("Loaded default configuration.");
                config
            }
            Err(e) => {
                warn!("Failed to read {}: {}. Using defaults.", CONFIG_PATH, e);
                Config::default()
            }
        };

        let config = config.with_api_key_override(std::env::var(API_KEY_ENV).ok());
        if config.api.api_key.is_empty() {
            warn!(
                "No API key configured; set {} or api.api_key in {}",
                API_KEY_ENV, CONFIG_PATH
            );
        }
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> io::Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, toml_string)
    }

    /// Blank values do not override.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api.api_key = key;
        }
        self
    }
}
