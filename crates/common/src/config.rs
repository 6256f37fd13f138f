//! Application configuration.

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Hosted relational store configuration.
    pub store: StoreConfig,
    /// Push delivery provider configuration.
    pub push: PushConfig,
    /// Step scheduler trigger configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Admin statistics configuration.
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Hosted relational store configuration.
///
/// The store exposes a PostgREST-compatible REST interface under
/// `{base_url}/rest/v1/` and a hosted auth user-info endpoint under
/// `{base_url}/auth/v1/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted store (no trailing slash).
    pub base_url: String,
    /// Service-role key, sent as both `apikey` and bearer credential.
    pub service_key: String,
}

/// Push delivery provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Provider application id.
    pub app_id: String,
    /// Provider REST API key.
    pub rest_api_key: String,
    /// Provider API base URL.
    #[serde(default = "default_push_api_base")]
    pub api_base: String,
}

/// Step scheduler trigger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Shared secret for manual trigger authorization
    /// (`Authorization: Bearer <secret>`).
    #[serde(default)]
    pub cron_secret: Option<String>,
    /// Header set by the trusted external scheduler. Requests carrying this
    /// header are accepted without the bearer secret.
    #[serde(default = "default_trigger_header")]
    pub trigger_header: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cron_secret: None,
            trigger_header: default_trigger_header(),
        }
    }
}

/// Admin statistics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// IANA timezone name used for all calendar boundaries and histogram
    /// keys in the stats report.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl StatsConfig {
    /// Parse the configured reporting timezone.
    pub fn reporting_timezone(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("invalid stats timezone: {e}")))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_push_api_base() -> String {
    "https://onesignal.com/api/v1".to_string()
}

fn default_trigger_header() -> String {
    "x-scheduler-trigger".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `DRIPCAST_ENV`)
    /// 3. Environment variables with `DRIPCAST_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("DRIPCAST_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DRIPCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DRIPCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
