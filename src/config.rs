use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub seed_demo_data: bool,
    pub critical_overdue_days: i64,
    pub rate_limit_per_ms: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 3000)?,
            seed_demo_data: parse_var("SEED_DEMO_DATA", true)?,
            critical_overdue_days: parse_var("CRITICAL_OVERDUE_DAYS", 7)?,
            rate_limit_per_ms: parse_var("RATE_LIMIT_PER_MS", 60)?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", 1000)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            seed_demo_data: true,
            critical_overdue_days: 7,
            rate_limit_per_ms: 60,
            rate_limit_burst: 1000,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} has an invalid value: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
