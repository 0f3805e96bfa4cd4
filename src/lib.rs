//! Rentrack Equipment Rental Tracking
//!
//! A Rust REST JSON server tracking equipment through registration, checkout,
//! return with condition assessment, and maintenance.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
