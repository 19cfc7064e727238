//! Server configuration from environment variables.

use std::env;

use http::HeaderValue;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Origins allowed by the CORS layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    /// `*`: any origin.
    #[default]
    Any,
    /// An explicit allow-list.
    List(Vec<HeaderValue>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Plain text or JSON log lines.
    pub log_format: LogFormat,
    /// CORS allowed origins.
    pub cors_allowed_origins: CorsOrigins,
    /// Ed25519 public key (PEM) used to verify bearer tokens.
    pub jwt_public_key: String,
    /// Accept `X-Identity` headers and anonymous callers.
    pub allow_dev_identity: bool,
    /// Buffer size of each per-category event channel.
    pub event_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_allowed_origins: CorsOrigins::Any,
            jwt_public_key: String::new(),
            allow_dev_identity: false,
            event_channel_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "text" or "json" (default: "text")
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origins or "*" (default: "*")
    /// - `JWT_PUBLIC_KEY`: Ed25519 PEM for bearer tokens (default: none)
    /// - `ALLOW_DEV_IDENTITY`: Accept `X-Identity` headers (default: false)
    /// - `EVENT_CHANNEL_CAPACITY`: Per-category event buffer (default: 256)
    ///
    /// Database settings are read separately by `feed_store::StoreConfig`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => defaults.port,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_lowercase) {
            None => defaults.log_format,
            Some(s) if s == "text" => LogFormat::Text,
            Some(s) if s == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected 'text' or 'json', got '{}'", other),
                });
            }
        };

        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors_allowed_origins,
        };

        let jwt_public_key = lookup("JWT_PUBLIC_KEY").unwrap_or_default();

        let allow_dev_identity = lookup("ALLOW_DEV_IDENTITY")
            .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(defaults.allow_dev_identity);

        let event_channel_capacity = match lookup("EVENT_CHANNEL_CAPACITY") {
            Some(raw) => parse_number("EVENT_CHANNEL_CAPACITY", &raw)?,
            None => defaults.event_channel_capacity,
        };
        if event_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EVENT_CHANNEL_CAPACITY".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            port,
            log_level,
            log_format,
            cors_allowed_origins,
            jwt_public_key,
            allow_dev_identity,
            event_channel_capacity,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("'{}' is not a valid number", raw),
    })
}

fn parse_origins(raw: &str) -> Result<CorsOrigins, ConfigError> {
    if raw.trim() == "*" {
        return Ok(CorsOrigins::Any);
    }

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin '{}'", origin),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigins::List)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
