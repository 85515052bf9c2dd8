//! Process configuration for the store and logging.
//!
//! # Responsibility
//! - Read the remote endpoint/credential pair and local store settings once.
//! - Keep parsing pure (`from_lookup`) so tests never touch the environment.
//!
//! # Invariants
//! - Values are trimmed; an empty value is the same as an absent one.
//! - The credential never appears in `Debug` output.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_REMOTE_URL: &str = "SUPABASE_URL";
pub const ENV_REMOTE_KEY: &str = "SUPABASE_KEY";
pub const ENV_DB_PATH: &str = "SIPINTAR_DB_PATH";
pub const ENV_LOCAL_PERSISTENCE: &str = "SIPINTAR_LOCAL_PERSISTENCE";
pub const ENV_REMOTE_TIMEOUT_SECS: &str = "SIPINTAR_REMOTE_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "SIPINTAR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SIPINTAR_LOG_DIR";

const DEFAULT_DB_PATH: &str = "sipintar.sqlite3";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;

/// Whether local-mode writes of registry collections survive the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalPersistence {
    /// Only accounts are written; other collections keep serving the seed.
    #[default]
    Session,
    /// Every collection is read-modify-written through the local store.
    Durable,
}

impl LocalPersistence {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "durable" => Ok(Self::Durable),
            other => Err(ConfigError::InvalidValue {
                key: ENV_LOCAL_PERSISTENCE,
                value: other.to_string(),
                expected: "session|durable",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Store configuration, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub remote_endpoint: Option<String>,
    pub remote_key: Option<String>,
    pub local_db_path: PathBuf,
    pub local_persistence: LocalPersistence,
    pub remote_timeout: Duration,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            remote_endpoint: None,
            remote_key: None,
            local_db_path: PathBuf::from(DEFAULT_DB_PATH),
            local_persistence: LocalPersistence::default(),
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            log_level: None,
            log_dir: None,
        }
    }
}

impl Debug for StoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("remote_endpoint", &self.remote_endpoint)
            .field(
                "remote_key",
                &self.remote_key.as_ref().map(|_| "<redacted>"),
            )
            .field("local_db_path", &self.local_db_path)
            .field("local_persistence", &self.local_persistence)
            .field("remote_timeout", &self.remote_timeout)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment, after loading an
    /// optional `.env` file from the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal production case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).and_then(non_empty);
        let defaults = Self::default();

        let local_persistence = match read(ENV_LOCAL_PERSISTENCE) {
            Some(value) => LocalPersistence::parse(&value)?,
            None => defaults.local_persistence,
        };
        let remote_timeout = match read(ENV_REMOTE_TIMEOUT_SECS) {
            Some(value) => parse_timeout(&value)?,
            None => defaults.remote_timeout,
        };

        Ok(Self {
            remote_endpoint: read(ENV_REMOTE_URL),
            remote_key: read(ENV_REMOTE_KEY),
            local_db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.local_db_path),
            local_persistence,
            remote_timeout,
            log_level: read(ENV_LOG_LEVEL),
            log_dir: read(ENV_LOG_DIR),
        })
    }

    /// Returns the endpoint/credential pair when both are configured.
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        let endpoint = self.remote_endpoint.as_deref().and_then(non_empty_str)?;
        let key = self.remote_key.as_deref().and_then(non_empty_str)?;
        Some((endpoint, key))
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_empty_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_REMOTE_TIMEOUT_SECS,
            value: value.to_string(),
            expected: "a positive number of seconds",
        }),
    }
}
