//! Server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default number of notes on one list page.
pub const DEFAULT_NOTES_PER_PAGE: u32 = 10;

/// Longest accepted session lifetime, one hundred years.
pub const MAX_SESSION_EXPIRY_HOURS: u64 = 24 * 365 * 100;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL.
    pub database_url: String,
    /// HMAC key for session tokens.
    pub session_secret: String,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Session lifetime in hours.
    pub session_expiry_hours: u64,
    /// Notes shown per list page.
    pub notes_per_page: u32,
}

impl ServerConfig {
    /// Configuration with every optional setting at its default.
    pub fn new(database_url: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            session_secret: session_secret.into(),
            port: 8000,
            log_level: "info".to_string(),
            session_expiry_hours: 24 * 14,
            notes_per_page: DEFAULT_NOTES_PER_PAGE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`: Database connection string
    /// - `SESSION_SECRET`: Key used to sign session cookies
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `SESSION_EXPIRY_HOURS`: Session lifetime, at most one hundred years (default: 336)
    /// - `COUNT_NOTES_ON_LIST_PAGE`: Notes per list page (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let session_secret = required("SESSION_SECRET")?;
        let mut config = Self::new(database_url, session_secret);

        if let Some(port) = parsed("PORT")? {
            config.port = port;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(hours) = parsed::<u64>("SESSION_EXPIRY_HOURS")? {
            if hours > MAX_SESSION_EXPIRY_HOURS {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_EXPIRY_HOURS".to_string(),
                    reason: format!("must not exceed {MAX_SESSION_EXPIRY_HOURS}"),
                });
            }
            config.session_expiry_hours = hours;
        }
        if let Some(per_page) = parsed::<u32>("COUNT_NOTES_ON_LIST_PAGE")? {
            if per_page == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "COUNT_NOTES_ON_LIST_PAGE".to_string(),
                    reason: "must be a positive integer".to_string(),
                });
            }
            config.notes_per_page = per_page;
        }

        Ok(config)
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn parsed<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
