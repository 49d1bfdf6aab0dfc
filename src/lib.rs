//! Single-screen terminal weather viewer.
//!
//! Shows current conditions for a typed city or for the current position.
//! [`app`] holds the screen state machine, [`api`] and [`location`] are the
//! two collaborators it drives, and [`tasks`] runs their requests off the UI
//! loop.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod location;
pub mod logging;
pub mod models;
pub mod tasks;
pub mod ui;
