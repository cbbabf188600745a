//! Configuration loading and constants.
//!
//! Loads the HTTP listener, UI, theme and logging settings from a TOML file and
//! defines constants for Cache-Control headers, the readiness check, template
//! filters and default paths. Database settings are not part of the file; they
//! come from the environment (see [`crate::store::DatabaseConfig`]).

use const_format::formatcp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// Pages are rendered from live database rows, so upstream caches must revalidate.
// Static assets are versioned with the binary and can be cached for a day.

/// Static assets (CSS) - long cache with immutable hint
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 86400;

/// Recipe pages and redirects
pub const CACHE_CONTROL_PAGES: &str = "no-cache";

pub const CACHE_CONTROL_STATIC: &str =
    formatcp!("public, max-age={}, immutable", HTTP_CACHE_STATIC_MAX_AGE);

/// Health responses must never be served from a cache
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// Database Readiness Constants
// =============================================================================

/// Connect timeout for the readiness check
pub const READINESS_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default MySQL port
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default MySQL host
pub const DEFAULT_DB_HOST: &str = "localhost";

// Fallbacks used only by the readiness check
pub const READINESS_DEFAULT_DB_USER: &str = "root";
pub const READINESS_DEFAULT_DB_NAME: &str = "recipes";

/// Prefix of the database environment variables (`DB_HOST`, `DB_USER`, ...)
pub const DB_ENV_PREFIX: &str = "DB_";

// =============================================================================
// Template Constants
// =============================================================================

/// Default word count for truncate_words filter
pub const DEFAULT_TRUNCATE_WORDS: usize = 30;

// Time unit constants (in seconds) for timeago filter
/// Seconds in a minute
pub const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds in an hour
pub const SECONDS_PER_HOUR: i64 = 3600;
/// Seconds in a day
pub const SECONDS_PER_DAY: i64 = 86400;
/// Seconds in a 30-day month
pub const SECONDS_PER_MONTH: i64 = 2592000;
/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: i64 = 31536000;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Glob pattern for template files, relative to the theme directory
pub const TEMPLATE_GLOB: &str = "templates/**/*";

/// Directory for static files, relative to the theme directory
pub const STATIC_DIR: &str = "static";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "recipes=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default site title
pub const DEFAULT_SITE_NAME: &str = "Recipes";

/// Graceful shutdown drain period
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Where templates and static files are read from
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Site title shown in header and page titles
    #[serde(default = "UiConfig::default_site_name")]
    pub site_name: String,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: Self::default_site_name(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_site_name() -> String {
        DEFAULT_SITE_NAME.to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Location of the `templates/` and `static/` directories
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "ThemeConfig::default_dir")]
    pub dir: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl ThemeConfig {
    fn default_dir() -> String {
        ".".to_string()
    }

    /// Glob matching every template file of the theme
    pub fn template_glob(&self) -> String {
        Path::new(&self.dir)
            .join(TEMPLATE_GLOB)
            .to_string_lossy()
            .into_owned()
    }

    pub fn static_path(&self) -> PathBuf {
        Path::new(&self.dir).join(STATIC_DIR)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Loads the file at `path`, falling back to the built-in defaults when the
    /// default configuration file is absent. An explicitly requested file must exist.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;

        if !matches!(config.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "Unknown logging.format '{}', expected \"text\" or \"json\"",
                config.logging.format
            )));
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
