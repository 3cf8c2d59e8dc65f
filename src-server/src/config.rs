use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub storage_dir: PathBuf,
    pub public_url: String,
    pub log_dir: PathBuf,
    pub pokeapi_url: String,
    /// Seeds a session for local development when set
    pub dev_token: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let port: u16 = try_load("ACTIVITY_HUB_PORT", "8080")?;
        let default_public_url = format!("http://localhost:{port}");

        Ok(Self {
            port,
            db_path: try_load("ACTIVITY_HUB_DB", "activity_hub.db")?,
            storage_dir: try_load("ACTIVITY_HUB_STORAGE_DIR", "storage")?,
            public_url: try_load("ACTIVITY_HUB_PUBLIC_URL", &default_public_url)?,
            log_dir: Self::log_dir(),
            pokeapi_url: try_load("POKEAPI_URL", "https://pokeapi.co/api/v2")?,
            dev_token: var("ACTIVITY_HUB_DEV_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }

    /// Read on its own so the logger is up before the rest of the config loads
    pub fn log_dir() -> PathBuf {
        log_dir_from(var("ACTIVITY_HUB_LOG_DIR"))
    }

    /// In-memory database and a caller-owned storage directory
    pub fn for_tests(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 0,
            db_path: PathBuf::from(":memory:"),
            storage_dir: storage_dir.into(),
            public_url: "http://localhost".to_string(),
            log_dir: PathBuf::from("logs"),
            pokeapi_url: "http://127.0.0.1:9/api/v2".to_string(),
            dev_token: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn log_dir_from(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    match value.parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!("Invalid {key} value: {e}");
            Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}
