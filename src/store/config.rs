//! Database connection settings read from `DB_*` environment variables.

use std::fmt;

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use super::StoreError;
use crate::config::{
    DB_ENV_PREFIX, DEFAULT_DB_HOST, DEFAULT_DB_PORT, READINESS_DEFAULT_DB_NAME,
    READINESS_DEFAULT_DB_USER,
};

fn default_host() -> String {
    DEFAULT_DB_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_DB_PORT
}

/// Settings for the connections used by request handlers.
///
/// `DB_USER`, `DB_PASSWORD` and `DB_NAME` are required; `DB_HOST` and `DB_PORT`
/// fall back to `localhost:3306`.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(envy::prefixed(DB_ENV_PREFIX).from_env()?)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        connect_options(&self.host, self.port, &self.user, &self.password, &self.name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Settings for the readiness check. Every field has a default, so loading never
/// fails because a variable is missing or malformed.
#[derive(Clone)]
pub struct ReadinessConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

/// Raw `DB_*` values for the readiness check. Plain optional text, so reading them cannot fail.
#[derive(Deserialize)]
struct ReadinessVars {
    host: Option<String>,
    port: Option<String>,
    user: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: Self::default_user(),
            password: String::new(),
            name: Self::default_name(),
        }
    }
}

impl ReadinessConfig {
    fn default_user() -> String {
        READINESS_DEFAULT_DB_USER.to_string()
    }

    fn default_name() -> String {
        READINESS_DEFAULT_DB_NAME.to_string()
    }

    /// Reads the readiness settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds the readiness settings from `DB_*` pairs. Each variable falls back to its
    /// own default: a non-numeric `DB_PORT` is logged and replaced by 3306 while
    /// the other overrides still apply.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: ReadinessVars = match envy::prefixed(DB_ENV_PREFIX).from_iter(vars) {
            Ok(vars) => vars,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable readiness settings, using defaults");
                return Self::default();
            }
        };

        let port = match vars.port {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    value = %raw,
                    error = %e,
                    "Invalid DB_PORT for readiness check, using default"
                );
                default_port()
            }),
            None => default_port(),
        };

        Self {
            host: vars.host.unwrap_or_else(default_host),
            port,
            user: vars.user.unwrap_or_else(Self::default_user),
            password: vars.password.unwrap_or_default(),
            name: vars.name.unwrap_or_else(Self::default_name),
        }
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        connect_options(&self.host, self.port, &self.user, &self.password, &self.name)
    }
}

impl fmt::Debug for ReadinessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn connect_options(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .password(password)
        .database(database)
}
