//! Process configuration, read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use hirecast_infra::{DEFAULT_LOOKBACK_YEARS, JobRecord};

pub const BIND_ADDR_ENV: &str = "HIRECAST_BIND_ADDR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const LOOKBACK_YEARS_ENV: &str = "HIRECAST_LOOKBACK_YEARS";
pub const REFRESH_SECS_ENV: &str = "HIRECAST_REFRESH_SECS";
pub const SEED_FILE_ENV: &str = "HIRECAST_SEED_FILE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to load seed file {path}: {reason}")]
    Seed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub lookback_years: u32,
    /// Enables the background forecast refresh when set.
    pub refresh_interval: Option<Duration>,
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid(BIND_ADDR_ENV, &bind_raw, e))?;

        let lookback_years = match get(LOOKBACK_YEARS_ENV) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => return Err(invalid(LOOKBACK_YEARS_ENV, &raw, "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(invalid(LOOKBACK_YEARS_ENV, &raw, e)),
            },
            None => DEFAULT_LOOKBACK_YEARS,
        };

        let refresh_interval = match get(REFRESH_SECS_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(invalid(REFRESH_SECS_ENV, &raw, "must be at least 1")),
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(e) => return Err(invalid(REFRESH_SECS_ENV, &raw, e)),
            },
            None => None,
        };

        Ok(Self {
            bind_addr,
            database_url: get(DATABASE_URL_ENV),
            lookback_years,
            refresh_interval,
            seed_file: get(SEED_FILE_ENV).map(PathBuf::from),
        })
    }

    pub fn is_database_configured(&self) -> bool {
        self.database_url.is_some()
    }

    /// Records from the seed file, or none when no seed file is configured.
    pub fn load_seed_records(&self) -> Result<Vec<JobRecord>, ConfigError> {
        let Some(path) = &self.seed_file else {
            return Ok(Vec::new());
        };
        let seed_error = |reason: String| ConfigError::Seed {
            path: path.clone(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
