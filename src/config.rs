//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::net::IpAddr;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_INIT_DATA_MAX_AGE_SECS, DEFAULT_JWT_EXPIRY_HOURS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_CLEANUP_INTERVAL_SECS,
    MIN_JWT_SECRET_LENGTH,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub telegram: TelegramConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
    /// `None` allows any origin
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Peers whose `X-Forwarded-For` / `X-Real-IP` headers are honoured
    pub trusted_proxies: Vec<IpAddr>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Rate limiting is disabled when no URL is configured
    pub url: Option<String>,
}

/// Telegram bot configuration
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Maximum accepted age of init data; 0 disables the check
    pub init_data_max_age_secs: i64,
}

/// JWT authentication configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

/// Session housekeeping configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cleanup_interval_secs: u64,
}

// Secrets stay out of debug output.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("init_data_max_age_secs", &self.init_data_max_age_secs)
            .finish()
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            telegram: TelegramConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            session: SessionConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_log_format(&env::var("LOG_FORMAT").unwrap_or_default())?,
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            trusted_proxies: parse_trusted_proxies(
                &env::var("TRUSTED_PROXIES").unwrap_or_default(),
            )?,
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
        })
    }
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN".to_string()))?;
        if bot_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue("TELEGRAM_BOT_TOKEN".to_string()));
        }

        let init_data_max_age_secs: i64 = env::var("TELEGRAM_INIT_DATA_MAX_AGE_SECS")
            .unwrap_or_else(|_| DEFAULT_INIT_DATA_MAX_AGE_SECS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TELEGRAM_INIT_DATA_MAX_AGE_SECS".to_string()))?;
        if init_data_max_age_secs < 0 {
            return Err(ConfigError::InvalidValue(
                "TELEGRAM_INIT_DATA_MAX_AGE_SECS".to_string(),
            ));
        }

        Ok(Self {
            bot_token,
            init_data_max_age_secs,
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "JWT_SECRET (must be at least {} bytes)",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let expiry_hours: i64 = env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_JWT_EXPIRY_HOURS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_EXPIRY_HOURS".to_string()))?;
        if expiry_hours <= 0 {
            return Err(ConfigError::InvalidValue("JWT_EXPIRY_HOURS".to_string()));
        }

        Ok(Self {
            secret,
            expiry_hours,
        })
    }

    /// Token lifetime in seconds
    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let cleanup_interval_secs: u64 = env::var("SESSION_CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_CLEANUP_INTERVAL_SECS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SESSION_CLEANUP_INTERVAL_SECS".to_string()))?;
        if cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_CLEANUP_INTERVAL_SECS".to_string(),
            ));
        }

        Ok(Self {
            cleanup_interval_secs,
        })
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
    }
}

fn parse_origins(value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    if value.is_empty() || value == "*" {
        return None;
    }

    Some(
        value
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect(),
    )
}

fn parse_trusted_proxies(value: &str) -> Result<Vec<IpAddr>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(|addr| {
            addr.parse()
                .map_err(|_| ConfigError::InvalidValue(format!("TRUSTED_PROXIES ({})", addr)))
        })
        .collect()
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            log_format: LogFormat::Pretty,
            cors_allowed_origins: None,
            trusted_proxies: Vec::new(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("").unwrap(), LogFormat::Pretty);
        assert_eq!(parse_log_format("JSON").unwrap(), LogFormat::Json);
        assert!(parse_log_format("xml").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), None);
        assert_eq!(parse_origins(""), None);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_trusted_proxies() {
        assert!(parse_trusted_proxies("").unwrap().is_empty());
        assert_eq!(
            parse_trusted_proxies("10.0.0.1, ::1").unwrap(),
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
        assert!(parse_trusted_proxies("10.0.0.0/8").is_err());
    }

    #[test]
    fn test_secrets_are_redacted_in_debug_output() {
        let jwt = JwtConfig {
            secret: "super-secret-value-that-is-long-enough".to_string(),
            expiry_hours: 24,
        };
        let rendered = format!("{:?}", jwt);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(jwt.expiry_seconds(), 86_400);
    }
}
