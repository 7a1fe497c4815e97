//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WATERLINE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `WATERLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `WATERLINE_PORT` - Listen port (default: 3000)
//! - `WATERLINE_BASE_URL` - Public URL (default: <http://localhost:3000>); `https` enables secure cookies
//! - `WATERLINE_LOG_FORMAT` - `json` or `text` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)
//!
//! ## Optional (TLS)
//! - `WATERLINE_TLS_CERT` - PEM-encoded certificate chain
//! - `WATERLINE_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        match (env("WATERLINE_TLS_CERT"), env("WATERLINE_TLS_KEY")) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "WATERLINE_TLS_*".to_string(),
                "Both WATERLINE_TLS_CERT and WATERLINE_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| env(key).unwrap_or_else(|| default.to_string());

        // DATABASE_URL is what `fly postgres attach` sets
        let database_url = env("WATERLINE_DATABASE_URL")
            .or_else(|| env("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("WATERLINE_DATABASE_URL".to_string()))?;
        let host = get_or("WATERLINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WATERLINE_HOST".to_string(), e.to_string()))?;
        let port = get_or("WATERLINE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WATERLINE_PORT".to_string(), e.to_string()))?;
        let base_url = get_or("WATERLINE_BASE_URL", "http://localhost:3000");
        let log_format = match get_or("WATERLINE_LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "WATERLINE_LOG_FORMAT".to_string(),
                    format!("expected json or text, got {other}"),
                ));
            }
        };
        let sentry_dsn = env("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        let sentry_environment = env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);
        let tls = TlsConfig::from_lookup(env)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
