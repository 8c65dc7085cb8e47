// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_name: String,
    pub callback_collection: String,
    pub failure_collection: String,
    pub store_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            database_name: "payhero".to_string(),
            callback_collection: "payments".to_string(),
            failure_collection: "callback_failures".to_string(),
            store_timeout_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment, loading `.env` first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::configuration(format!("PORT must be a number, got {:?}", raw)))?,
            None => defaults.port,
        };

        let store_timeout_ms = match var("STORE_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(AppError::configuration(format!(
                        "STORE_TIMEOUT_MS must be a positive number of milliseconds, got {:?}",
                        raw
                    )))
                }
            },
            None => defaults.store_timeout_ms,
        };

        Ok(AppConfig {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            database_url: var("DATABASE_URL"),
            database_name: var("DATABASE_NAME").unwrap_or(defaults.database_name),
            callback_collection: var("CALLBACK_COLLECTION").unwrap_or(defaults.callback_collection),
            failure_collection: var("FAILURE_COLLECTION").unwrap_or(defaults.failure_collection),
            store_timeout_ms,
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "database_url_set": self.database_url.is_some(),
            "database_name": self.database_name,
            "callback_collection": self.callback_collection,
            "failure_collection": self.failure_collection,
            "store_timeout_ms": self.store_timeout_ms,
        })
    }
}
