//! Configuration management and environment variable loading

use crate::types::StaticDeviceDirectory;
use crate::{EmotrackError, Result};
use std::env;
use std::path::Path;

/// Dashboard origins allowed by default
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "https://emotion-frontend-production.up.railway.app",
    "http://localhost:3000",
];

/// Load environment variables from .env file
///
/// Looks in the current directory and its parents. A missing file is not an
/// error.
///
/// # Example
///
/// ```no_run
/// use emotrack_core::load_env;
///
/// load_env().ok();
/// let url = std::env::var("EMOTRACK_DATABASE_URL").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(EmotrackError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(EmotrackError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::info!("Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(EmotrackError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Split a comma-separated list, dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// sqlx SQLite connection URL
    pub database_url: String,
    /// Connection pool size for file databases
    pub max_connections: u32,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Device summarized when a request names none
    pub default_device_id: String,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    /// `id=Name` pairs for the device directory
    pub device_names: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:emotion.db".to_string(),
            max_connections: 5,
            host: "0.0.0.0".to_string(),
            port: 8000,
            default_device_id: "jetson_1".to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            device_names: String::new(),
        }
    }
}

impl ServiceConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: get_env_or("EMOTRACK_DATABASE_URL", &defaults.database_url),
            max_connections: get_env_int("EMOTRACK_DB_MAX_CONNECTIONS", defaults.max_connections),
            host: get_env_or("EMOTRACK_HOST", &defaults.host),
            port: get_env_int("EMOTRACK_PORT", defaults.port),
            default_device_id: get_env_or(
                "EMOTRACK_DEFAULT_DEVICE_ID",
                &defaults.default_device_id,
            ),
            cors_origins: env::var("EMOTRACK_CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            device_names: get_env_or("EMOTRACK_DEVICE_NAMES", ""),
        }
    }

    /// Check settings that would otherwise fail later at startup
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(EmotrackError::config("database URL must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(EmotrackError::config(
                "EMOTRACK_DB_MAX_CONNECTIONS must be at least 1",
            ));
        }
        if self.default_device_id.is_empty() {
            return Err(EmotrackError::config(
                "EMOTRACK_DEFAULT_DEVICE_ID must not be empty",
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Device directory built from `device_names`
    pub fn device_directory(&self) -> StaticDeviceDirectory {
        StaticDeviceDirectory::parse(&self.device_names)
    }
}
