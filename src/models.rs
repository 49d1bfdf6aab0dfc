use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description shown when the service sends no condition entry.
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// A position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` for NaN or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = (-90.0..=90.0).contains(&latitude);
        let lon_ok = (-180.0..=180.0).contains(&longitude);
        (lat_ok && lon_ok).then_some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parsed snapshot of current conditions for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub location_name: String,
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
    /// Degrees Celsius.
    pub feels_like: f64,
    /// Percent.
    pub humidity: f64,
    /// Hectopascal.
    pub pressure: f64,
    /// Metres per second.
    pub wind_speed: f64,
    pub fetched_at: DateTime<Local>,
}

impl WeatherResult {
    pub fn from_response(res: CurrentWeatherResponse, fetched_at: DateTime<Local>) -> Self {
        let description = res
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

        Self {
            location_name: res.name,
            temperature: res.main.temp,
            description,
            feels_like: res.main.feels_like,
            humidity: res.main.humidity,
            pressure: res.main.pressure,
            wind_speed: res.wind.speed,
            fetched_at,
        }
    }

    /// The seven lines of the result panel, values untouched apart from units.
    pub fn display_lines(&self) -> [String; 7] {
        [
            format!("City: {}", self.location_name),
            format!("Temperature: {}°C", self.temperature),
            format!("Description: {}", self.description),
            format!("Feels Like: {}°C", self.feels_like),
            format!("Humidity: {}%", self.humidity),
            format!("Pressure: {} hPa", self.pressure),
            format!("Wind Speed: {} m/s", self.wind_speed),
        ]
    }
}

// Wire format of the current-weather endpoint. Only the fields we render are
// declared; everything else in the payload is ignored.

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}
