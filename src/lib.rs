//! Elidune Circulation
//!
//! Concurrency core for lending: a shared catalog of items with stock
//! counts, per-account loan ledgers, a writer-preferring lock guarding both,
//! a borrow that can sleep until stock comes back, and advisory lock
//! diagnostics. The `api` module exposes every operation over REST JSON.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod sync;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build fresh in-memory state for the given configuration
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(repository::Repository::new(), &config.circulation);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
