//! Process configuration, read once at startup.
//!
//! `main` builds a [`Config`] and hands it to [`crate::app::build_app`];
//! nothing else reads the environment.

use std::collections::HashMap;
use std::time::Duration;

use eventhub_auth::{DEFAULT_TOKEN_TTL_HOURS, password::DEFAULT_COST};
use eventhub_observability::LogFormat;

/// Development-only signing secret used when `JWT_SECRET` is unset.
pub const INSECURE_DEFAULT_SECRET: &str = "secret";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub store_timeout: Duration,
    pub password_hash_cost: u32,
    pub token_ttl: chrono::Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: INSECURE_DEFAULT_SECRET.to_string(),
            database_url: None,
            store_timeout: Duration::from_secs(3),
            password_hash_cost: DEFAULT_COST,
            token_ttl: chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Process environment first, then `./.env` when present.
    pub fn from_env() -> Self {
        let dotenv = dotenvy::dotenv_iter()
            .map(collect_entries)
            .unwrap_or_default();
        Self::from_layers(|key| std::env::var(key).ok(), &dotenv)
    }

    /// `lookup` wins over `fallback` for every key.
    pub fn from_layers(
        lookup: impl Fn(&str) -> Option<String>,
        fallback: &HashMap<String, String>,
    ) -> Self {
        Self::from_lookup(|key| lookup(key).or_else(|| fallback.get(key).cloned()))
    }

    /// Build from an arbitrary key lookup. Unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            port: parsed("PORT")
                .and_then(|v| u16::try_from(v).ok())
                .unwrap_or(defaults.port),
            jwt_secret: lookup("JWT_SECRET")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.jwt_secret),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            store_timeout: parsed("STORE_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            password_hash_cost: parsed("BCRYPT_COST")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|cost| (4..=31).contains(cost))
                .unwrap_or(defaults.password_hash_cost),
            token_ttl: parsed("TOKEN_TTL_HOURS")
                .and_then(|h| i64::try_from(h).ok())
                .filter(|h| *h > 0)
                .map(chrono::Duration::hours)
                .unwrap_or(defaults.token_ttl),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_format),
        }
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEFAULT_SECRET
    }
}

/// Keep the parseable lines of a dotenv file.
fn collect_entries<R: std::io::Read>(iter: dotenvy::Iter<R>) -> HashMap<String, String> {
    iter.filter_map(Result::ok).collect()
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("store_timeout", &self.store_timeout)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("token_ttl", &self.token_ttl)
            .field("log_format", &self.log_format)
            .finish()
    }
}
