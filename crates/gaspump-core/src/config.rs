//! Runtime configuration.
//!
//! All settings come from environment variables. The binary loads a local
//! `.env` file before reading them, so the same keys work in either place.
//!
//! | Variable              | Used by        | Default                  |
//! |-----------------------|----------------|--------------------------|
//! | `GASPUMP_API_URL`     | station cache  | production endpoint      |
//! | `DATABASE_URL`        | loader         | built from `DB_*`        |
//! | `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` | loader | required unless `DATABASE_URL` |
//! | `GASPUMP_OPERATOR_ID` | loader         | `3`                      |

use std::fmt;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Station API endpoint
pub const DEFAULT_API_URL: &str = "https://gaspump-18b4eae89030.herokuapp.com/api/stations";

/// A snapshot younger than this is served without touching the network.
pub const CACHE_TTL_SECONDS: i64 = 300;

/// Upper bound on a single fetch.
pub const REQUEST_TIMEOUT_SECONDS: u64 = 5;

/// Operator the scraped stations belong to.
pub const DEFAULT_OPERATOR_ID: i64 = 3;

/// Userinfo escaping: everything outside the RFC 3986 unreserved set.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

// ============================================================================
// Station cache
// ============================================================================

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub api_url: String,
    pub freshness: chrono::Duration,
    pub request_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            freshness: chrono::Duration::seconds(CACHE_TTL_SECONDS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = non_empty(lookup("GASPUMP_API_URL")) {
            config.api_url = url;
        }
        config
    }
}

// ============================================================================
// Database
// ============================================================================

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

// The URL embeds the password.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .finish()
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// `DATABASE_URL` wins; otherwise a MySQL URL is assembled from the
    /// `DB_*` variables. The password may be absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = non_empty(lookup("DATABASE_URL")) {
            return Ok(Self { url });
        }

        let host = non_empty(lookup("DB_HOST")).ok_or(ConfigError::MissingVar("DB_HOST"))?;
        let user = non_empty(lookup("DB_USER")).ok_or(ConfigError::MissingVar("DB_USER"))?;
        let name = non_empty(lookup("DB_NAME")).ok_or(ConfigError::MissingVar("DB_NAME"))?;

        let user = utf8_percent_encode(&user, USERINFO);
        let credentials = match non_empty(lookup("DB_PASSWORD")) {
            Some(password) => format!("{}:{}", user, utf8_percent_encode(&password, USERINFO)),
            None => user.to_string(),
        };

        Ok(Self {
            url: format!("mysql://{}@{}/{}", credentials, host, name),
        })
    }
}

// ============================================================================
// Loader
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Part of every station's natural key; stations are only ever matched
    /// against rows of the same operator.
    pub operator_id: i64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            operator_id: DEFAULT_OPERATOR_ID,
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match non_empty(lookup("GASPUMP_OPERATOR_ID")) {
            Some(raw) => {
                let operator_id = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                    name: "GASPUMP_OPERATOR_ID",
                    value: raw.clone(),
                })?;
                Ok(Self { operator_id })
            }
            None => Ok(Self::default()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
