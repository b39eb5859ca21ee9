//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "setaccio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.fillout.com/v1/api/forms";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 120;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Command-line arguments for the Setaccio binary.
#[derive(Debug, Parser)]
#[command(name = "setaccio", version, about = "Filtered form-responses proxy")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SETACCIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the upstream forms API base URL.
    #[arg(long = "upstream-base-url", value_name = "URL")]
    pub upstream_base_url: Option<String>,

    /// Override the upstream request timeout.
    #[arg(long = "upstream-timeout-seconds", value_name = "SECONDS")]
    pub upstream_timeout_seconds: Option<u64>,

    /// Toggle the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache entry time-to-live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the cache eviction sweep cadence.
    #[arg(long = "cache-sweep-interval-seconds", value_name = "SECONDS")]
    pub cache_sweep_interval_seconds: Option<u64>,

    /// Override the maximum number of cached result pages.
    #[arg(long = "cache-max-entries", value_name = "COUNT")]
    pub cache_max_entries: Option<usize>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub upstream: UpstreamSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: Url,
    /// Sent as a bearer token on every upstream request. Supplied via
    /// `SETACCIO__UPSTREAM__API_KEY` or a configuration file, never the CLI.
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: NonZeroU64,
    pub sweep_interval_seconds: NonZeroU64,
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse CLI arguments and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("SETACCIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    upstream: RawUpstreamSettings,
    cache: RawCacheSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUpstreamSettings {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
    sweep_interval_seconds: Option<u64>,
    max_entries: Option<usize>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.upstream_base_url.as_ref() {
            self.upstream.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.upstream_timeout_seconds {
            self.upstream.timeout_seconds = Some(seconds);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_sweep_interval_seconds {
            self.cache.sweep_interval_seconds = Some(seconds);
        }
        if let Some(count) = overrides.cache_max_entries {
            self.cache.max_entries = Some(count);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let host = raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = raw.server.port.unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| LoadError::invalid("server.host", format!("`{host}` is not a host")))?;

        let level_text = raw.logging.level.unwrap_or_else(|| "info".to_string());
        let level = LevelFilter::from_str(&level_text).map_err(|_| {
            LoadError::invalid("logging.level", format!("`{level_text}` is not a level"))
        })?;
        let format = if raw.logging.json.unwrap_or(false) {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };

        let base_url_text = raw
            .upstream
            .base_url
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());
        let base_url = Url::parse(&base_url_text).map_err(|err| {
            LoadError::invalid("upstream.base_url", format!("`{base_url_text}`: {err}"))
        })?;
        let api_key = raw
            .upstream
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                LoadError::invalid(
                    "upstream.api_key",
                    "must be set (e.g. via SETACCIO__UPSTREAM__API_KEY)",
                )
            })?;
        let timeout = Duration::from_secs(
            raw.upstream
                .timeout_seconds
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        );

        let cache = CacheSettings {
            enabled: raw.cache.enabled.unwrap_or(true),
            ttl_seconds: non_zero_u64(
                raw.cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS),
                "cache.ttl_seconds",
            )?,
            sweep_interval_seconds: non_zero_u64(
                raw.cache
                    .sweep_interval_seconds
                    .unwrap_or(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
                "cache.sweep_interval_seconds",
            )?,
            max_entries: NonZeroUsize::new(
                raw.cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
            )
            .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be at least 1"))?,
        };

        Ok(Self {
            server: ServerSettings { addr },
            logging: LoggingSettings { level, format },
            upstream: UpstreamSettings {
                base_url,
                api_key,
                timeout,
            },
            cache,
        })
    }
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be at least 1"))
}
