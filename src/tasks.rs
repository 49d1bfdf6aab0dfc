//! Runs [`Command`]s off the UI loop.
//!
//! Each command becomes one tokio task that reports back with exactly one
//! [`Event`] carrying the command's generation.

use crate::api::WeatherClient;
use crate::app::Command;
use crate::config::Config;
use crate::error::FetchError;
use crate::events::Event;
use crate::location::LocationProvider;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

/// The collaborators a command may need. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Services {
    pub weather: Arc<WeatherClient>,
    pub locator: Arc<LocationProvider>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self {
            weather: Arc::new(WeatherClient::new(&config.api)?),
            locator: Arc::new(LocationProvider::from_config(&config.location)),
        })
    }
}

pub async fn execute(command: Command, services: &Services) -> Event {
    match command {
        Command::Locate { generation } => Event::LocationResolved {
            generation,
            outcome: services.locator.current_coordinates().await,
        },
        Command::FetchByCity { generation, query } => Event::WeatherFetched {
            generation,
            outcome: services.weather.fetch_by_city(&query).await,
        },
        Command::FetchByCoordinates { generation, coords } => Event::WeatherFetched {
            generation,
            outcome: services.weather.fetch_by_coordinates(coords).await,
        },
    }
}

pub fn spawn(command: Command, services: &Services, tx: UnboundedSender<Event>) -> JoinHandle<()> {
    let services = services.clone();
    tokio::spawn(async move {
        let event = execute(command, &services).await;
        if tx.send(event).is_err() {
            debug!("Event loop gone, dropping request result");
        }
    })
}
