//! Event types and the main event loop driver for the weather screen.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, and the
//! completions of location and weather requests) and the [`EventHandler`],
//! which runs a background task that polls crossterm for key events and emits
//! periodic [`Event::Tick`]s. Request tasks post their results through
//! [`EventHandler::tx`].

use crate::error::{FetchError, LocationError};
use crate::models::{Coordinates, WeatherResult};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Floor for the tick interval; zero would spin the input thread.
pub const MIN_TICK_RATE_MS: u64 = 10;

/// Configured tick interval, never below [`MIN_TICK_RATE_MS`].
pub fn tick_rate(tick_rate_ms: u64) -> Duration {
    Duration::from_millis(tick_rate_ms.max(MIN_TICK_RATE_MS))
}

/// Events processed by the application event loop.
///
/// Request completions carry the generation they were issued under so the
/// [`App`](crate::app::App) can drop answers to superseded requests.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for the spinner and notification expiry.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// A one-shot position read finished.
    LocationResolved {
        generation: u64,
        outcome: Result<Coordinates, LocationError>,
    },
    /// A weather fetch finished.
    WeatherFetched {
        generation: u64,
        outcome: Result<WeatherResult, FetchError>,
    },
}

/// Multiplexes terminal input, ticks and request completions into a single
/// event stream.
///
/// The sender ([`tx`](EventHandler::tx)) is cloned into every request task;
/// the receiver is consumed by [`next`](EventHandler::next) in the main loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick reader.
    ///
    /// The reader runs on a blocking thread since crossterm polling blocks.
    /// It stops on a terminal read error, or once the handler is dropped and
    /// the next send fails.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::task::spawn_blocking(move || {
            let tick_rate = tick_rate(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            if event_tx.send(Event::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tick_rate_is_raised_to_floor() {
        assert_eq!(tick_rate(0), Duration::from_millis(MIN_TICK_RATE_MS));
        assert_eq!(tick_rate(150), Duration::from_millis(150));
    }
}
