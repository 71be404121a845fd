//! UI rendering modules for the SensorGrid application.
//!
//! Each submodule adds `render_*` methods to [`crate::app::SensorGridApp`]:
//! - `toolbar` - Load button, progress bar and status line
//! - `controls` - Measurement/excitation selectors and category plot buttons
//! - `grid` - Scrollable data table
//! - `chart` - Line chart of the last plot request
//! - `error_dialog` - Modal error notification
//! - `toast` - Toast notification system

pub mod chart;
pub mod controls;
pub mod error_dialog;
pub mod grid;
pub mod toast;
pub mod toolbar;
