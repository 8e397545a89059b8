//! Environment configuration for the finboard binary.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use finboard_core::Error;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_FETCH_CONCURRENCY: usize = 5;
const DEFAULT_FETCH_MAX_RETRIES: u32 = 2;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,
    pub fetch_max_retries: u32,
    pub requests_per_minute: u32,
    pub geocoder_user_agent: Option<String>,
}

impl Config {
    /// Loads `.env` when present, then reads the `FINBOARD_*` variables.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let log_format = match read("FINBOARD_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Configuration(format!(
                    "FINBOARD_LOG_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        let fetch_timeout_secs: u64 = parse_var(
            "FINBOARD_FETCH_TIMEOUT_SECS",
            read("FINBOARD_FETCH_TIMEOUT_SECS"),
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;
        let fetch_concurrency: usize = parse_var(
            "FINBOARD_FETCH_CONCURRENCY",
            read("FINBOARD_FETCH_CONCURRENCY"),
            DEFAULT_FETCH_CONCURRENCY,
        )?;
        let requests_per_minute: u32 = parse_var(
            "FINBOARD_REQUESTS_PER_MINUTE",
            read("FINBOARD_REQUESTS_PER_MINUTE"),
            DEFAULT_REQUESTS_PER_MINUTE,
        )?;

        for (key, value) in [
            ("FINBOARD_FETCH_TIMEOUT_SECS", fetch_timeout_secs),
            ("FINBOARD_FETCH_CONCURRENCY", fetch_concurrency as u64),
            ("FINBOARD_REQUESTS_PER_MINUTE", u64::from(requests_per_minute)),
        ] {
            if value == 0 {
                return Err(Error::Configuration(format!("{} must be at least 1", key)));
            }
        }

        Ok(Self {
            data_dir: read("FINBOARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            log_format,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            fetch_concurrency,
            fetch_max_retries: parse_var(
                "FINBOARD_FETCH_MAX_RETRIES",
                read("FINBOARD_FETCH_MAX_RETRIES"),
                DEFAULT_FETCH_MAX_RETRIES,
            )?,
            requests_per_minute,
            geocoder_user_agent: read("FINBOARD_GEOCODER_USER_AGENT"),
        })
    }

    /// The geocoder refuses anonymous clients, so profile refreshes need this.
    pub fn require_geocoder_user_agent(&self) -> Result<&str, Error> {
        self.geocoder_user_agent.as_deref().ok_or_else(|| {
            Error::Configuration(
                "missing credentials: FINBOARD_GEOCODER_USER_AGENT is not set".to_string(),
            )
        })
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, Error> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            Error::Configuration(format!("{} has invalid value '{}'", key, value))
        }),
    }
}
