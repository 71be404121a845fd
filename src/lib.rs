//! SensorGrid - a desktop viewer for delimited sensor measurement logs
//!
//! Loads a CSV (or semicolon/tab separated) file on a background worker,
//! shows it in a grid and plots RPM against a measurement column.
//!
//! ## Module Structure
//!
//! - [`app`] - Main application and eframe::App implementation
//! - [`config`] - Startup configuration (file argument, batch size)
//! - [`display`] - Display sink: accumulated table and current chart
//! - [`loader`] - Background loading and its event contract
//! - [`parsers`] - Delimited file parser and table types
//! - [`state`] - Controller state, controls and constants
//! - [`ui`] - User interface components
//!   - `toolbar` - Load button, progress and status
//!   - `controls` - Plot selectors and category buttons
//!   - `grid` - Data table
//!   - `chart` - Line chart
//!   - `error_dialog` - Modal error notification
//!   - `toast` - Toast notification system

pub mod app;
pub mod config;
pub mod display;
pub mod loader;
pub mod parsers;
pub mod state;
pub mod ui;
