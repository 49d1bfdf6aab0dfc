//! User location resolution for the weather screen.
//!
//! Two concerns live here. [`request_permission`] decides whether the
//! current position may be read at all, based on the configured
//! [`PermissionPolicy`] and whether the user already consented this session.
//! [`LocationProvider`] then performs a single position read, either through
//! IP geolocation (IpApi) or from coordinates fixed in the config.

use crate::config::LocationConfig;
use crate::error::LocationError;
use crate::models::Coordinates;
use ipgeolocate::{Locator, Service};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// How location consent is obtained.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Prompt the user on the screen.
    #[default]
    Ask,
    Always,
    Never,
}

/// Where a position read comes from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    #[default]
    Ip,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Outcome of asking for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    Decided(Permission),
    /// The user has to answer a prompt first.
    Prompt,
}

/// Decides location access without side effects.
///
/// A grant given earlier in the session is honoured under [`PermissionPolicy::Ask`],
/// the same way an OS remembers it. Denials are not remembered, so asking
/// again prompts again.
pub fn request_permission(policy: PermissionPolicy, previously_granted: bool) -> PermissionRequest {
    match policy {
        PermissionPolicy::Always => PermissionRequest::Decided(Permission::Granted),
        PermissionPolicy::Never => PermissionRequest::Decided(Permission::Denied),
        PermissionPolicy::Ask if previously_granted => {
            PermissionRequest::Decided(Permission::Granted)
        }
        PermissionPolicy::Ask => PermissionRequest::Prompt,
    }
}

/// One-shot position reads. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct LocationProvider {
    source: LocationSource,
    lookup_ip: String,
    manual: (f64, f64),
}

impl LocationProvider {
    pub fn from_config(config: &LocationConfig) -> Self {
        Self {
            source: config.source,
            lookup_ip: config.lookup_ip.clone(),
            manual: (config.manual_lat, config.manual_lon),
        }
    }

    /// Reads the current position once.
    ///
    /// # Errors
    ///
    /// [`LocationError::Unavailable`] when the geolocation service fails, or
    /// when the reported (or configured) latitude/longitude do not parse or
    /// fall outside valid ranges. There is no fallback position.
    pub async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        match self.source {
            LocationSource::Manual => {
                let (lat, lon) = self.manual;
                Coordinates::new(lat, lon).ok_or_else(|| {
                    LocationError::Unavailable(format!(
                        "configured coordinates ({}, {}) are out of range",
                        lat, lon
                    ))
                })
            }
            LocationSource::Ip => {
                let loc = Locator::get(&self.lookup_ip, Service::IpApi)
                    .await
                    .map_err(|e| {
                        error!("Error using geolocation service: {}", e);
                        LocationError::Unavailable(e.to_string())
                    })?;

                let coords = parse_coordinates(&loc.latitude, &loc.longitude)?;
                info!(
                    "Geolocation successful - {} ({}, {})",
                    coords, loc.city, loc.country
                );
                Ok(coords)
            }
        }
    }
}

/// The geolocation service reports degrees as strings.
fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates, LocationError> {
    let parse = |s: &str| s.trim().parse::<f64>().ok();
    parse(lat)
        .zip(parse(lon))
        .and_then(|(lat, lon)| Coordinates::new(lat, lon))
        .ok_or_else(|| {
            LocationError::Unavailable(format!("unusable coordinates '{}', '{}'", lat, lon))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_and_never_skip_the_prompt() {
        for granted_before in [false, true] {
            assert_eq!(
                request_permission(PermissionPolicy::Always, granted_before),
                PermissionRequest::Decided(Permission::Granted)
            );
            assert_eq!(
                request_permission(PermissionPolicy::Never, granted_before),
                PermissionRequest::Decided(Permission::Denied)
            );
        }
    }

    #[test]
    fn ask_prompts_until_granted() {
        assert_eq!(
            request_permission(PermissionPolicy::Ask, false),
            PermissionRequest::Prompt
        );
        assert_eq!(
            request_permission(PermissionPolicy::Ask, true),
            PermissionRequest::Decided(Permission::Granted)
        );
    }

    #[test]
    fn parses_service_strings() {
        let c = parse_coordinates("48.8566", " 2.3522 ").unwrap();
        assert_eq!(c, Coordinates::new(48.8566, 2.3522).unwrap());
    }

    #[test]
    fn garbage_from_service_is_unavailable() {
        assert!(matches!(
            parse_coordinates("", "2.35"),
            Err(LocationError::Unavailable(_))
        ));
        assert!(matches!(
            parse_coordinates("123.0", "2.35"),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn manual_source_returns_configured_position() {
        let config = LocationConfig {
            source: LocationSource::Manual,
            manual_lat: 51.5072,
            manual_lon: -0.1276,
            ..LocationConfig::default()
        };
        let provider = LocationProvider::from_config(&config);
        let coords = provider.current_coordinates().await.unwrap();
        assert_eq!(coords, Coordinates::new(51.5072, -0.1276).unwrap());
    }

    #[tokio::test]
    async fn manual_source_rejects_invalid_position() {
        let config = LocationConfig {
            source: LocationSource::Manual,
            manual_lat: 95.0,
            ..LocationConfig::default()
        };
        let provider = LocationProvider::from_config(&config);
        assert!(matches!(
            provider.current_coordinates().await,
            Err(LocationError::Unavailable(_))
        ));
    }
}
