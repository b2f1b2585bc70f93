use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use deskbook_core::booking::SchemaVersion;

/// Errors raised while reading configuration at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("The remote backend requires {0}")]
    MissingRemoteSetting(&'static str),
}

/// Which persistence backend the process talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(other.to_string()),
        }
    }
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    /// Present iff `backend` is remote.
    pub remote: Option<RemoteSettings>,
    /// Directory holding the local JSON documents (default: ".deskbook")
    pub data_dir: PathBuf,
    pub schema_version: SchemaVersion,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 1,000)
    pub cache_max_entries: usize,
    /// Extra attempts for a failed read (default: 1). Writes are never retried.
    pub cache_read_retries: u32,
    /// Capacity of the realtime invalidation channel (default: 32)
    pub realtime_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DESKBOOK_BACKEND` - `local` or `remote` (default: local)
    /// - `DESKBOOK_REMOTE_URL` / `DESKBOOK_REMOTE_KEY` - required for remote
    /// - `DESKBOOK_DATA_DIR` - local document directory (default: ".deskbook")
    /// - `DESKBOOK_SCHEMA_VERSION` - `v1` or `v2` (default: v2)
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1,000)
    /// - `CACHE_READ_RETRIES` - Read retries (default: 1)
    /// - `REALTIME_CHANNEL_CAPACITY` - Invalidation channel size (default: 32)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = parse_or("DESKBOOK_BACKEND", get("DESKBOOK_BACKEND"), BackendKind::Local)?;
        let remote = match backend {
            BackendKind::Local => None,
            BackendKind::Remote => {
                let url = get("DESKBOOK_REMOTE_URL")
                    .ok_or(ConfigError::MissingRemoteSetting("DESKBOOK_REMOTE_URL"))?;
                let api_key = get("DESKBOOK_REMOTE_KEY")
                    .ok_or(ConfigError::MissingRemoteSetting("DESKBOOK_REMOTE_KEY"))?;
                Some(RemoteSettings {
                    url: url.trim_end_matches('/').to_string(),
                    api_key,
                })
            }
        };

        Ok(Self {
            backend,
            remote,
            data_dir: get("DESKBOOK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".deskbook")),
            schema_version: parse_or(
                "DESKBOOK_SCHEMA_VERSION",
                get("DESKBOOK_SCHEMA_VERSION"),
                SchemaVersion::V2,
            )?,
            cache_ttl_seconds: parse_or("CACHE_TTL_SECONDS", get("CACHE_TTL_SECONDS"), 300)?,
            cache_max_entries: parse_positive(
                "CACHE_MAX_ENTRIES",
                get("CACHE_MAX_ENTRIES"),
                1_000,
            )?,
            cache_read_retries: parse_or("CACHE_READ_RETRIES", get("CACHE_READ_RETRIES"), 1)?,
            realtime_channel_capacity: parse_positive(
                "REALTIME_CHANNEL_CAPACITY",
                get("REALTIME_CHANNEL_CAPACITY"),
                32,
            )?,
        })
    }

    /// Local-backend configuration rooted at `data_dir`, everything else default.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Local,
            remote: None,
            data_dir: data_dir.into(),
            schema_version: SchemaVersion::V2,
            cache_ttl_seconds: 300,
            cache_max_entries: 1_000,
            cache_read_retries: 1,
            realtime_channel_capacity: 32,
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_positive(
    name: &'static str,
    value: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    let parsed = parse_or(name, value, default)?;
    if parsed == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            value: "0".to_string(),
        });
    }
    Ok(parsed)
}
