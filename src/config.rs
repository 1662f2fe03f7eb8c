//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Store credentials are looked up in two places, in order:
//! 1. `SUPABASE_URL` / `SUPABASE_KEY` in the environment (hosted secrets)
//! 2. `[store] url` / `key` in the local config file

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the store endpoint
pub const ENV_STORE_URL: &str = "SUPABASE_URL";

/// Environment variable holding the store access key
pub const ENV_STORE_KEY: &str = "SUPABASE_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Remote table configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Project URL, used when `SUPABASE_URL` is not set
    #[serde(default)]
    pub url: Option<String>,

    /// Access key, used when `SUPABASE_KEY` is not set
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_record_id")]
    pub record_id: i64,

    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_table() -> String {
    "user_settings".to_string()
}

fn default_record_id() -> i64 {
    1
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: default_table(),
            record_id: default_record_id(),
            request_timeout_secs: None,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle longer than this are dropped
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,

    /// Upper bound on live sessions; the least recently seen one is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_idle_ttl() -> u64 {
    24 * 60 * 60
}

fn default_max_sessions() -> usize {
    256
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Where the store credentials came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    ConfigFile,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Endpoint and key for the remote table
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
    pub source: CredentialSource,
}

// The key never goes to the log.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Nothing is logged here: this runs before the subscriber exists, so the
    /// outcome is handed back for the caller to report.
    pub fn load_default() -> LoadedConfig {
        Self::load_first(&default_config_paths())
    }

    /// Load the first readable file among `paths`, falling back to the
    /// environment. Files that exist but fail to load are kept in `skipped`.
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Resolve store credentials from the process environment, then the file
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    /// Resolve store credentials with a custom environment lookup
    pub fn credentials_from<F>(&self, lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        if let (Some(url), Some(key)) = (
            non_empty(lookup(ENV_STORE_URL)),
            non_empty(lookup(ENV_STORE_KEY)),
        ) {
            return Ok(Credentials {
                url,
                key,
                source: CredentialSource::Environment,
            });
        }

        if let (Some(url), Some(key)) = (
            non_empty(self.store.url.clone()),
            non_empty(self.store.key.clone()),
        ) {
            return Ok(Credentials {
                url,
                key,
                source: CredentialSource::ConfigFile,
            });
        }

        Err(ConfigError::MissingCredentials)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(host) = lookup("HEALTH_ASSISTANT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("HEALTH_ASSISTANT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Store overrides
        if let Some(table) = lookup("HEALTH_ASSISTANT_TABLE") {
            self.store.table = table;
        }
        if let Some(id) = lookup("HEALTH_ASSISTANT_RECORD_ID") {
            if let Ok(id) = id.parse() {
                self.store.record_id = id;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("HEALTH_ASSISTANT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HEALTH_ASSISTANT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Outcome of [`Config::load_default`]
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,

    /// File the config came from, `None` when running on defaults
    pub source: Option<PathBuf>,

    /// Files that exist but could not be read or parsed
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Write the load outcome to the log once the subscriber is up
    pub fn report(&self) {
        for err in &self.skipped {
            tracing::warn!("Skipping config: {}", err);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Searched in order by [`Config::load_default`]
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("health-assistant").join("config.toml"));
    }
    paths.push(PathBuf::from("./config.toml"));
    paths
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error(
        "Store credentials not found: set SUPABASE_URL and SUPABASE_KEY or fill [store] url/key in the config file"
    )]
    MissingCredentials,
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Health Assistant Configuration
#
# Environment variables override these settings:
# - SUPABASE_URL / SUPABASE_KEY (take precedence over [store] url/key)
# - HEALTH_ASSISTANT_HOST
# - HEALTH_ASSISTANT_PORT
# - HEALTH_ASSISTANT_TABLE
# - HEALTH_ASSISTANT_RECORD_ID
# - HEALTH_ASSISTANT_LOG_LEVEL
# - HEALTH_ASSISTANT_LOG_FORMAT

[server]
# Web server host
host = "0.0.0.0"

# Web server port
port = 8501

# Allowed CORS origins for the JSON API (empty = same origin only)
cors_origins = []

[store]
# Supabase project URL and key, used when the environment does not provide them
# url = "https://your-project.supabase.co"
# key = ""

# Table and row holding the record
table = "user_settings"
record_id = 1

# Request timeout in seconds (unset = wait indefinitely)
# request_timeout_secs = 10

[session]
# Drop browser sessions idle for longer than this (seconds)
idle_ttl_secs = 86400

# Keep at most this many sessions; the least recently seen one is dropped first
max_sessions = 256

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
