//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 6969;
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 300;
pub const DEFAULT_ICON_BASE_URL: &str = "https://community.fastly.steamstatic.com/economy/image/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err("must be one of: development, production, test".to_string()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub database_url: String,
    /// TTL for cached snapshot order books; zero disables the cache
    pub cache_duration: Duration,
    pub icon_base_url: String,
    pub rate_limit_enabled: bool,
    /// Key rate limits on `X-Forwarded-For`; only safe behind a proxy that sets it
    pub trust_proxy: bool,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let environment = parse_or(&lookup, "APP_ENV", Environment::Development)?;
        let cache_secs = parse_or(&lookup, "CACHE_DURATION", DEFAULT_CACHE_DURATION_SECS)?;
        let icon_base_url =
            lookup("ITEM_ICON_BASE_URL").unwrap_or_else(|| DEFAULT_ICON_BASE_URL.to_string());
        let rate_limit_enabled = parse_or(&lookup, "RATE_LIMIT_ENABLED", true)?;
        let trust_proxy = parse_or(&lookup, "TRUST_PROXY", false)?;
        let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;

        Ok(Self {
            port,
            environment,
            database_url,
            cache_duration: Duration::from_secs(cache_secs),
            icon_base_url,
            rate_limit_enabled,
            trust_proxy,
            run_migrations,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
