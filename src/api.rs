use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::{Coordinates, CurrentWeatherResponse, WeatherResult};
use chrono::Local;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{error, info};

/// Unit system sent with every request; the screen labels assume it.
const UNITS: &str = "metric";

/// Longest error body carried into a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Current-weather lookups against an OpenWeather-compatible endpoint.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub async fn fetch_by_city(&self, query: &str) -> Result<WeatherResult, FetchError> {
        info!("Fetching weather for city '{}'", query);
        let req = self.client.get(&self.base_url).query(&[("q", query)]);
        self.send(req).await
    }

    pub async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherResult, FetchError> {
        info!("Fetching weather for coordinates {}", coords);
        let req = self
            .client
            .get(&self.base_url)
            .query(&[("lat", coords.latitude), ("lon", coords.longitude)]);
        self.send(req).await
    }

    async fn send(&self, req: RequestBuilder) -> Result<WeatherResult, FetchError> {
        let res = req
            .query(&[("units", UNITS), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            error!("Weather API error {}: {}", status, body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: CurrentWeatherResponse = serde_json::from_str(&body)?;
        Ok(WeatherResult::from_response(parsed, Local::now()))
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
