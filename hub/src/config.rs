use crate::errors::{Error, Result};
use crate::store::StoreConfig;
use chrono::Duration;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
    pub log_level: String,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing, unparsable or
    /// unrepresentable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();
        let staleness_secs: i64 = parse_or(&lookup, "STALENESS_SECS", 60);

        Self {
            http_addr: lookup("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            store: StoreConfig {
                temperature_capacity: parse_or(
                    &lookup,
                    "TEMPERATURE_CAPACITY",
                    defaults.temperature_capacity,
                ),
                generic_capacity: parse_or(&lookup, "GENERIC_CAPACITY", defaults.generic_capacity),
                temperature_default_limit: parse_or(
                    &lookup,
                    "TEMPERATURE_DEFAULT_LIMIT",
                    defaults.temperature_default_limit,
                ),
                generic_default_limit: parse_or(
                    &lookup,
                    "GENERIC_DEFAULT_LIMIT",
                    defaults.generic_default_limit,
                ),
                staleness: Duration::try_seconds(staleness_secs).unwrap_or(defaults.staleness),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.temperature_capacity == 0 {
            return Err(Error::Validation(
                "TEMPERATURE_CAPACITY must be greater than zero".to_string(),
            ));
        }
        if self.store.generic_capacity == 0 {
            return Err(Error::Validation(
                "GENERIC_CAPACITY must be greater than zero".to_string(),
            ));
        }
        if self.store.staleness <= Duration::zero() {
            return Err(Error::Validation(
                "STALENESS_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
