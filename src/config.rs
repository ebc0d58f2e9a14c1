//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("fundacion").join("fundacion.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./fundacion_data/fundacion.db".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a bearer token
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,

    /// Admin account created on startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_session_ttl() -> i64 {
    24
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl(),
            admin_email: None,
            admin_password: None,
            admin_name: default_admin_name(),
        }
    }
}

/// Dashboard client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Preferred backend base URL, tried first during discovery
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Extra hosts (typically LAN IPs) probed when the API URL is down
    #[serde(default)]
    pub candidate_hosts: Vec<String>,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_client_timeout")]
    pub request_timeout_ms: u64,

    /// Where the persistent auth cookie lives
    #[serde(default = "default_cookie_file")]
    pub cookie_file: String,

    /// How often the auth watcher re-reads the token
    #[serde(default = "default_auth_poll")]
    pub auth_poll_interval_ms: u64,
}

fn default_api_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_probe_timeout() -> u64 {
    1500
}

fn default_client_timeout() -> u64 {
    10_000
}

fn default_cookie_file() -> String {
    dirs::config_dir()
        .map(|p| p.join("fundacion").join("cookies.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./.fundacion_cookies.json".to_string())
}

fn default_auth_poll() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            candidate_hosts: Vec::new(),
            probe_timeout_ms: default_probe_timeout(),
            request_timeout_ms: default_client_timeout(),
            cookie_file: default_cookie_file(),
            auth_poll_interval_ms: default_auth_poll(),
        }
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
    "fundacion=info,tower_http=debug".to_string()
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

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the configured level; `format = "json"` switches
    /// to structured output for log shippers.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.level));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.format.eq_ignore_ascii_case("json") {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        };

        if let Err(e) = result {
            eprintln!("Tracing already initialized: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("fundacion").join("config.toml")),
            Some(PathBuf::from("/etc/fundacion/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("FUNDACION_DB_PATH") {
            self.store.path = path;
        }

        if let Some(host) = var("FUNDACION_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("FUNDACION_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(email) = var("FUNDACION_ADMIN_EMAIL") {
            self.auth.admin_email = Some(email);
        }
        if let Some(password) = var("FUNDACION_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password);
        }
        if let Some(ttl) = var("FUNDACION_SESSION_TTL_HOURS").and_then(|t| t.parse().ok()) {
            self.auth.session_ttl_hours = ttl;
        }

        if let Some(url) = var("FUNDACION_API_URL") {
            self.client.api_url = url;
        }
        if let Some(hosts) = var("FUNDACION_CANDIDATE_HOSTS") {
            self.client.candidate_hosts = hosts
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if let Some(file) = var("FUNDACION_COOKIE_FILE") {
            self.client.cookie_file = file;
        }

        if let Some(level) = var("FUNDACION_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FUNDACION_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Fundacion Configuration
#
# Environment variables override these settings:
# - FUNDACION_DB_PATH
# - FUNDACION_API_HOST
# - FUNDACION_API_PORT
# - FUNDACION_ADMIN_EMAIL / FUNDACION_ADMIN_PASSWORD
# - FUNDACION_SESSION_TTL_HOURS
# - FUNDACION_API_URL
# - FUNDACION_CANDIDATE_HOSTS (comma-separated)
# - FUNDACION_COOKIE_FILE
# - FUNDACION_LOG_LEVEL
# - FUNDACION_LOG_FORMAT

[store]
# SQLite database file
path = "./fundacion_data/fundacion.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Request timeout in seconds
request_timeout_secs = 30

[auth]
# Bearer token lifetime (hours)
session_ttl_hours = 24

# Admin account ensured at startup
# admin_email = "admin@example.org"
# admin_password = "change-me-please"
admin_name = "Administrator"

[client]
# Backend tried first by the dashboards
api_url = "http://localhost:8090"

# Extra hosts probed when the backend above is unreachable
candidate_hosts = []

# Per-candidate probe timeout (ms)
probe_timeout_ms = 1500

# Request timeout (ms)
request_timeout_ms = 10000

# Auth status polling interval (ms)
auth_poll_interval_ms = 1000

[logging]
# Log filter: trace, debug, info, warn, error or a full EnvFilter directive
level = "fundacion=info,tower_http=debug"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.auth.session_ttl_hours, 24);
        assert_eq!(config.client.auth_poll_interval_ms, 1000);
        assert!(config.auth.admin_email.is_none());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.client.probe_timeout_ms, 1500);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [api]
            port = 9000

            [client]
            candidate_hosts = ["192.168.1.20"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.client.candidate_hosts, vec!["192.168.1.20"]);
        assert_eq!(config.client.api_url, "http://localhost:8090");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FUNDACION_API_PORT", "7001"),
            ("FUNDACION_CANDIDATE_HOSTS", "10.0.0.5, ,10.0.0.6"),
            ("FUNDACION_ADMIN_EMAIL", "root@example.org"),
            ("FUNDACION_SESSION_TTL_HOURS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.port, 7001);
        assert_eq!(config.client.candidate_hosts, vec!["10.0.0.5", "10.0.0.6"]);
        assert_eq!(config.auth.admin_email.as_deref(), Some("root@example.org"));
        assert_eq!(config.auth.session_ttl_hours, 24);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
