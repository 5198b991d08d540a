//! Attendance server
//!
//! REST JSON API for geofenced employee check-in / check-out: employees open
//! and close one attendance session per day from within an office's radius,
//! administrators and HR read aggregated reports.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
