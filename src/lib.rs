//! Terminal dashboard for COVID-19 confirmed-case counts.
//!
//! The core is [`reshape`] (wide feed → per-country series and per-date
//! snapshots) and [`locate`] (nearest sample for a pointer date). Both are
//! pure functions over the loaded [`data::feed::Feed`]; the [`app`], [`ui`],
//! [`chart`] and [`map`] modules draw the two scenes with ratatui.

pub mod app;
pub mod braille;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod locate;
pub mod map;
pub mod names;
pub mod reshape;
pub mod telemetry;
pub mod ui;

pub use error::{DataError, DataResult};
