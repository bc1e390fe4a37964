//! Configuration module
//!
//! Settings are read from a TOML file (default
//! `~/.config/chirpy/config.toml`) and may be overridden by the
//! `JWT_SECRET` and `POLKA_KEY` environment variables.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::jwt::{TokenSecret, DEFAULT_ACCESS_TOKEN_TTL_SECS};
use crate::auth::refresh::DEFAULT_REFRESH_TOKEN_TTL_DAYS;
use crate::telemetry::LogFormat;

/// Upper bound on `security.access_token_ttl_secs` (30 days)
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Upper bound on `security.refresh_token_ttl_days` (10 years)
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chirpy")
        .join("config.toml")
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

/// `[security]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Static API key expected from the payment webhook
    pub polka_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            polka_key: String::new(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `chirpy_auth=debug`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Build from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("POLKA_KEY") {
            self.security.polka_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;
        if security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret must be set".into()));
        }
        if security.polka_key.is_empty() {
            return Err(ConfigError::Invalid("security.polka_key must be set".into()));
        }
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&security.access_token_ttl_secs) {
            return Err(ConfigError::Invalid(format!(
                "security.access_token_ttl_secs must be between 1 and {}",
                MAX_ACCESS_TOKEN_TTL_SECS
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&security.refresh_token_ttl_days) {
            return Err(ConfigError::Invalid(format!(
                "security.refresh_token_ttl_days must be between 1 and {}",
                MAX_REFRESH_TOKEN_TTL_DAYS
            )));
        }
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::Invalid(format!("logging.format: {}", e)))?;
        Ok(())
    }

    /// Immutable runtime settings for the session service
    pub fn auth_settings(&self) -> Result<AuthSettings, ConfigError> {
        let access_token_ttl = Duration::try_seconds(self.security.access_token_ttl_secs)
            .ok_or_else(|| {
                ConfigError::Invalid("security.access_token_ttl_secs is out of range".into())
            })?;
        let refresh_token_ttl = Duration::try_days(self.security.refresh_token_ttl_days)
            .ok_or_else(|| {
                ConfigError::Invalid("security.refresh_token_ttl_days is out of range".into())
            })?;

        Ok(AuthSettings {
            secret: TokenSecret::from(self.security.jwt_secret.as_str()),
            access_token_ttl,
            refresh_token_ttl,
            api_key: self.security.polka_key.clone(),
        })
    }
}

/// Settings read once at startup and never changed afterwards
#[derive(Clone)]
pub struct AuthSettings {
    pub secret: TokenSecret,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub api_key: String,
}

impl AuthSettings {
    /// Settings with the default lifetimes
    pub fn new(secret: impl Into<TokenSecret>, api_key: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &self.secret)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
