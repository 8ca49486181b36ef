use std::path::PathBuf;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::limits::MAX_SHOPS;

/// Server settings, read once from `SALOND_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub data_dir: PathBuf,
    pub password: String,
    pub max_connections: usize,
    pub max_shops: usize,
    pub compact_threshold: u64,
    /// Fixed offset of the shops' wall clock from UTC.
    pub offset: FixedOffset,
    pub metrics_port: Option<u16>,
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={:?}: {}", self.var, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables take their defaults;
    /// set but malformed ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let offset_minutes: i32 = parsed(&lookup, "SALOND_UTC_OFFSET_MINUTES", 0)?;
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError {
                var: "SALOND_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
                reason: "offset must be within +/- 24 hours",
            })?;

        let max_connections: usize = parsed(&lookup, "SALOND_MAX_CONNECTIONS", 256)?;
        if max_connections == 0 {
            return Err(ConfigError {
                var: "SALOND_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "must be at least 1",
            });
        }

        let metrics_port = match lookup("SALOND_METRICS_PORT") {
            Some(v) => Some(parse_value("SALOND_METRICS_PORT", &v)?),
            None => None,
        };

        Ok(Self {
            port: parsed(&lookup, "SALOND_PORT", 5433)?,
            bind: lookup("SALOND_BIND").unwrap_or_else(|| "0.0.0.0".into()),
            data_dir: PathBuf::from(lookup("SALOND_DATA_DIR").unwrap_or_else(|| "./data".into())),
            password: lookup("SALOND_PASSWORD").unwrap_or_else(|| "salond".into()),
            max_connections,
            max_shops: parsed(&lookup, "SALOND_MAX_SHOPS", MAX_SHOPS)?,
            compact_threshold: parsed(&lookup, "SALOND_COMPACT_THRESHOLD", 1000)?,
            offset,
            metrics_port,
            tls_cert: lookup("SALOND_TLS_CERT"),
            tls_key: lookup("SALOND_TLS_KEY"),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parse_value<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        var,
        value: value.to_string(),
        reason: "not a valid number",
    })
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(v) => parse_value(var, &v),
        None => Ok(default),
    }
}
