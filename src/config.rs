//! Runtime configuration read from environment variables.
//!
//! - `HOST`: bind address, default `0.0.0.0`
//! - `PORT`: bind port, default `5000`
//! - `DATABASE_URL`: `PostgreSQL` connection string; unset selects the
//!   in-memory store
//! - `DATABASE_POOL_SIZE`: connection pool size, default `10`
//! - `JWT_SECRET`: required HS256 secret for bearer tokens
//! - `UPLOAD_DIR`: proof upload directory, default `uploads`
//! - `APP_ENV`: `development` exposes error detail in responses
//! - `CORS_ALLOWED_ORIGIN`: single allowed origin; unset allows any

use std::collections::HashMap;
use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEVELOPMENT: &str = "development";
const NOT_UTF8: &str = "<not valid UTF-8>";

/// Variables read by [`AppConfig::from_vars`].
const RECOGNIZED_VARS: [&str; 8] = [
    "HOST",
    "PORT",
    "DATABASE_URL",
    "DATABASE_POOL_SIZE",
    "JWT_SECRET",
    "UPLOAD_DIR",
    "APP_ENV",
    "CORS_ALLOWED_ORIGIN",
];

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// `PostgreSQL` connection string, if persistence is configured.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Shared secret for verifying bearer tokens.
    pub jwt_secret: String,
    /// Directory proof uploads are written to.
    pub upload_dir: String,
    /// Whether error responses include internal detail.
    pub expose_error_detail: bool,
    /// Origin allowed by CORS; `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("pool_size", &self.pool_size)
            .field("upload_dir", &self.upload_dir)
            .field("expose_error_detail", &self.expose_error_detail)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `JWT_SECRET` is missing, a recognized
    /// variable is not valid UTF-8, or a numeric or address variable cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(utf8_vars(std::env::vars_os())?)
    }

    /// Reads configuration from explicit key/value pairs.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        let lookup = |name: &str| values.get(name).map(|value| value.trim().to_owned());

        let host_value = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let host: IpAddr = host_value.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: host_value.clone(),
        })?;
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let pool_size = parse_or("DATABASE_POOL_SIZE", lookup("DATABASE_POOL_SIZE"), DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                value: "0".to_owned(),
            });
        }

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            database_url: lookup("DATABASE_URL"),
            pool_size,
            jwt_secret: lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            upload_dir: lookup("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned()),
            expose_error_detail: lookup("APP_ENV")
                .is_some_and(|env| env.eq_ignore_ascii_case(DEVELOPMENT)),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
        })
    }
}

/// Converts raw environment pairs to strings.
///
/// Pairs that are not valid UTF-8 are skipped unless they name a recognized
/// variable, which is reported as invalid.
fn utf8_vars<I>(vars: I) -> Result<Vec<(String, String)>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut converted = Vec::new();
    for (raw_key, raw_value) in vars {
        let Ok(key) = raw_key.into_string() else {
            continue;
        };
        match raw_value.into_string() {
            Ok(value) => converted.push((key, value)),
            Err(_) => {
                if let Some(&name) = RECOGNIZED_VARS.iter().find(|name| **name == key) {
                    return Err(ConfigError::Invalid {
                        name,
                        value: NOT_UTF8.to_owned(),
                    });
                }
            }
        }
    }
    Ok(converted)
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })
    })
}
