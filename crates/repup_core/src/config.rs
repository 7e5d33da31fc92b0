//! Storage configuration.
//!
//! # Responsibility
//! - Describe where the database lives and how the connection pool is bounded.
//! - Load those values from environment-style key/value lookups.
//!
//! # Invariants
//! - `max_connections` is at least 1.
//! - The effective idle floor never exceeds `max_connections`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATABASE_PATH: &str = "REPUP_DATABASE_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "REPUP_DB_MAX_CONNECTIONS";
pub const ENV_MIN_IDLE: &str = "REPUP_DB_MIN_IDLE";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "REPUP_DB_IDLE_TIMEOUT_SECS";
pub const ENV_MAX_LIFETIME_SECS: &str = "REPUP_DB_MAX_LIFETIME_SECS";
pub const ENV_ACQUIRE_TIMEOUT_SECS: &str = "REPUP_DB_ACQUIRE_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required key is absent or blank.
    Missing(&'static str),
    /// Key is present but cannot be parsed.
    Invalid { key: &'static str, value: String },
    /// Pool must allow at least one connection.
    ZeroPoolSize,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, value } => {
                write!(f, "invalid value `{value}` for setting `{key}`")
            }
            Self::ZeroPoolSize => write!(f, "`{ENV_MAX_CONNECTIONS}` must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Database location and pool bounds handed to [`crate::db::open_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Hard cap on open connections, idle ones included.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_idle: u32,
    /// Idle connections above `min_idle` are closed after this. `0` disables.
    pub idle_timeout_secs: u64,
    /// Connections are recycled after this lifetime. `0` disables.
    pub max_lifetime_secs: u64,
    /// Bound for connection acquisition and the startup liveness probe.
    pub acquire_timeout_secs: u64,
}

impl DbConfig {
    /// Creates a config with default pool bounds for the given database file.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_idle: DEFAULT_MIN_IDLE,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            max_lifetime_secs: DEFAULT_MAX_LIFETIME_SECS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; absent optional keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(ENV_DATABASE_PATH)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(ENV_DATABASE_PATH))?;

        let mut config = Self::new(path);
        if let Some(value) = parse_optional(&lookup, ENV_MAX_CONNECTIONS)? {
            config.max_connections = value;
        }
        if let Some(value) = parse_optional(&lookup, ENV_MIN_IDLE)? {
            config.min_idle = value;
        }
        if let Some(value) = parse_optional(&lookup, ENV_IDLE_TIMEOUT_SECS)? {
            config.idle_timeout_secs = value;
        }
        if let Some(value) = parse_optional(&lookup, ENV_MAX_LIFETIME_SECS)? {
            config.max_lifetime_secs = value;
        }
        if let Some(value) = parse_optional(&lookup, ENV_ACQUIRE_TIMEOUT_SECS)? {
            config.acquire_timeout_secs = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        Ok(())
    }

    pub fn effective_min_idle(&self) -> u32 {
        self.min_idle.min(self.max_connections)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        non_zero_secs(self.max_lifetime_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs.max(1))
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn parse_optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
