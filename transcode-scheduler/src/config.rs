//! Application configuration.
//!
//! Every setting comes from an environment variable (a `.env` file is loaded
//! first by the binary) and has a default.
//!
//! | variable | default |
//! |----------|---------|
//! | `DATABASE_URL` | `sqlite:scheduler.db?mode=rwc` |
//! | `API_BIND_ADDRESS` | `0.0.0.0` |
//! | `API_PORT` | `3000` |
//! | `PUBLIC_BASE_URL` | `http://localhost:3000` |
//! | `TRANSCODER_URL` | `http://localhost:8080` |
//! | `TRANSCODER_TIMEOUT_SECS` | `10` |
//! | `JOBS_PER_PAGE` | `20` |
//! | `SEARCH_TIMEZONE` | `UTC` |
//! | `LOG_DIR` | `./logs` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::api::server::ApiServerConfig;
use crate::services::{DEFAULT_PER_PAGE, DEFAULT_TRANSCODER_TIMEOUT};
use crate::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:scheduler.db?mode=rwc";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TRANSCODER_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ApiServerConfig,
    /// Base of the callback URL handed to the transcoder.
    pub public_base_url: String,
    pub transcoder_url: String,
    pub transcoder_timeout: Duration,
    pub jobs_per_page: u32,
    pub search_timezone: Tz,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            server: ApiServerConfig::default(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            transcoder_url: DEFAULT_TRANSCODER_URL.to_string(),
            transcoder_timeout: DEFAULT_TRANSCODER_TIMEOUT,
            jobs_per_page: DEFAULT_PER_PAGE,
            search_timezone: Tz::UTC,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(address) = get("API_BIND_ADDRESS") {
            config.server.bind_address = address;
        }
        if let Some(port) = get("API_PORT") {
            config.server.port = parse("API_PORT", &port)?;
        }
        if let Some(url) = get("PUBLIC_BASE_URL") {
            config.public_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("TRANSCODER_URL") {
            config.transcoder_url = url;
        }
        if let Some(secs) = get("TRANSCODER_TIMEOUT_SECS") {
            let secs: u64 = parse("TRANSCODER_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(Error::config("TRANSCODER_TIMEOUT_SECS must be positive"));
            }
            config.transcoder_timeout = Duration::from_secs(secs);
        }
        if let Some(per_page) = get("JOBS_PER_PAGE") {
            config.jobs_per_page = parse("JOBS_PER_PAGE", &per_page)?;
            if config.jobs_per_page == 0 {
                return Err(Error::config("JOBS_PER_PAGE must be positive"));
            }
        }
        if let Some(zone) = get("SEARCH_TIMEZONE") {
            config.search_timezone = zone
                .parse::<Tz>()
                .map_err(|_| Error::config(format!("Unknown SEARCH_TIMEZONE '{zone}'")))?;
        }
        if let Some(dir) = get("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::config(format!("Invalid {key} '{value}'")))
}
