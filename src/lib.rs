pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use config::Config;
pub use error::{AppError, AppResult};

use crate::services::RentalService;

#[derive(Clone)]
pub struct AppState {
    /// Writers hold the lock for a whole operation, so no caller ever sees a
    /// half-applied booking, return or swap.
    pub rental: Arc<RwLock<RentalService>>,
    pub config: Config,
}

impl AppState {
    pub fn new(rental: RentalService, config: Config) -> Self {
        Self {
            rental: Arc::new(RwLock::new(rental)),
            config,
        }
    }
}
