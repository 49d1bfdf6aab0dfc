//! Screen state machine.
//!
//! [`App`] owns everything the weather screen shows. It never performs I/O:
//! key presses and request completions go in, and at most one [`Command`]
//! comes out for the runtime to execute. Rendering only ever sees an
//! immutable [`Snapshot`].

use crate::config::Config;
use crate::error::{FetchError, LocationError};
use crate::events::Event;
use crate::location::{request_permission, Permission, PermissionPolicy, PermissionRequest};
use crate::models::{Coordinates, WeatherResult};
use chrono::{DateTime, Duration, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, error, info, warn};

pub const FETCH_FAILED_MESSAGE: &str = "Error fetching weather data. Please try again.";

/// Upper bound for `ui.notice_seconds` (one day).
const MAX_NOTICE_SECONDS: u64 = 86_400;

/// Side effects requested by the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate {
        generation: u64,
    },
    FetchByCity {
        generation: u64,
        query: String,
    },
    FetchByCoordinates {
        generation: u64,
        coords: Coordinates,
    },
}

impl Command {
    pub fn generation(&self) -> u64 {
        match self {
            Command::Locate { generation }
            | Command::FetchByCity { generation, .. }
            | Command::FetchByCoordinates { generation, .. } => *generation,
        }
    }
}

/// What the outstanding request is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingPermission,
    Locating,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    generation: u64,
    stage: Stage,
}

/// A user-facing error, shown as a banner until dismissed or expired.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub detail: Option<String>,
    pub raised_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Idle,
    Loading(Stage),
    Loaded(&'a WeatherResult),
}

/// Everything a frame needs, frozen at the time it was taken.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub query: &'a str,
    pub view: View<'a>,
    pub coords: Option<Coordinates>,
    pub notification: Option<&'a Notification>,
    pub permission_prompt: bool,
    pub tick: usize,
}

pub struct App {
    pub query: String,
    pub tick_count: usize,
    pub should_quit: bool,

    result: Option<WeatherResult>,
    coords: Option<Coordinates>,
    in_flight: Option<InFlight>,
    generation: u64,

    policy: PermissionPolicy,
    permission_granted: bool,
    // The prompt sits on top of whatever request is already running.
    awaiting_permission: bool,

    notification: Option<Notification>,
    notice_ttl: Duration,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            query: String::new(),
            tick_count: 0,
            should_quit: false,
            result: None,
            coords: None,
            in_flight: None,
            generation: 0,
            policy: config.location.permission,
            permission_granted: false,
            awaiting_permission: false,
            notification: None,
            notice_ttl: Duration::seconds(config.ui.notice_seconds.min(MAX_NOTICE_SECONDS) as i64),
        }
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        self.result.as_ref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coords
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.stage().is_some()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let view = match (self.stage(), &self.result) {
            (Some(stage), _) => View::Loading(stage),
            (None, Some(result)) => View::Loaded(result),
            (None, None) => View::Idle,
        };

        Snapshot {
            query: &self.query,
            view,
            coords: self.coords,
            notification: self.notification.as_ref(),
            permission_prompt: self.awaiting_permission,
            tick: self.tick_count,
        }
    }

    /// First frame: try to show weather for the current position.
    pub fn on_mount(&mut self) -> Option<Command> {
        info!("Screen mounted, requesting location");
        self.use_location()
    }

    /// "Use GPS Location": permission check, position read, then fetch.
    pub fn use_location(&mut self) -> Option<Command> {
        match request_permission(self.policy, self.permission_granted) {
            PermissionRequest::Decided(Permission::Granted) => {
                let generation = self.next_generation();
                Some(self.start_locating(generation))
            }
            PermissionRequest::Decided(Permission::Denied) => {
                info!("Permission to access location was denied");
                None
            }
            PermissionRequest::Prompt => {
                self.awaiting_permission = true;
                None
            }
        }
    }

    /// Answer to the on-screen location prompt. Ignored when no prompt is open.
    ///
    /// Only a grant starts a new request; a denial leaves any running one alone.
    pub fn answer_permission(&mut self, granted: bool) -> Option<Command> {
        if !self.awaiting_permission {
            return None;
        }
        self.awaiting_permission = false;

        if granted {
            self.permission_granted = true;
            let generation = self.next_generation();
            Some(self.start_locating(generation))
        } else {
            info!("Permission to access location was denied");
            None
        }
    }

    /// "Get Weather": fetch by the typed city, if there is one.
    pub fn submit(&mut self) -> Option<Command> {
        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();

        self.awaiting_permission = false;
        let generation = self.next_generation();
        self.in_flight = Some(InFlight {
            generation,
            stage: Stage::Fetching,
        });
        Some(Command::FetchByCity { generation, query })
    }

    pub fn update(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::Tick => {
                self.on_tick(Local::now());
                None
            }
            Event::Input(key) => self.handle_key(key),
            Event::LocationResolved {
                generation,
                outcome,
            } => self.on_location(generation, outcome),
            Event::WeatherFetched {
                generation,
                outcome,
            } => {
                self.on_weather(generation, outcome, Local::now());
                None
            }
        }
    }

    pub fn on_tick(&mut self, now: DateTime<Local>) {
        self.tick_count = self.tick_count.wrapping_add(1);

        let expired = self
            .notification
            .as_ref()
            .is_some_and(|n| now - n.raised_at >= self.notice_ttl);
        if expired {
            self.notification = None;
        }
    }

    pub fn on_location(
        &mut self,
        generation: u64,
        outcome: Result<Coordinates, LocationError>,
    ) -> Option<Command> {
        if !self.is_current(generation, Stage::Locating) {
            debug!("Dropping superseded location result (generation {})", generation);
            return None;
        }

        match outcome {
            Ok(coords) => {
                self.coords = Some(coords);
                self.in_flight = Some(InFlight {
                    generation,
                    stage: Stage::Fetching,
                });
                Some(Command::FetchByCoordinates { generation, coords })
            }
            Err(e) => {
                warn!("Error fetching location: {}", e);
                self.in_flight = None;
                None
            }
        }
    }

    pub fn on_weather(
        &mut self,
        generation: u64,
        outcome: Result<WeatherResult, FetchError>,
        now: DateTime<Local>,
    ) {
        if !self.is_current(generation, Stage::Fetching) {
            debug!("Dropping superseded weather result (generation {})", generation);
            return;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                info!("Weather loaded for '{}'", result.location_name);
                self.result = Some(result);
                self.notification = None;
            }
            Err(e) => {
                error!(status = ?e.status(), "Error fetching weather data: {}", e);
                self.notification = Some(Notification {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                    detail: Some(e.to_string()),
                    raised_at: now,
                });
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        // The location prompt is modal.
        if self.awaiting_permission {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.answer_permission(true)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.answer_permission(false)
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('g') if ctrl => self.use_location(),
            KeyCode::Char('u') if ctrl => {
                self.query.clear();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                None
            }
            KeyCode::Backspace => {
                self.query.pop();
                None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if self.notification.take().is_none() {
                    self.should_quit = true;
                }
                None
            }
            _ => None,
        }
    }

    fn stage(&self) -> Option<Stage> {
        if self.awaiting_permission {
            return Some(Stage::AwaitingPermission);
        }
        self.in_flight.map(|f| f.stage)
    }

    fn is_current(&self, generation: u64, stage: Stage) -> bool {
        self.in_flight == Some(InFlight { generation, stage })
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn start_locating(&mut self, generation: u64) -> Command {
        self.in_flight = Some(InFlight {
            generation,
            stage: Stage::Locating,
        });
        Command::Locate { generation }
    }
}
