//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    /// `None` selects the in-memory message store
    pub database: Option<DatabaseConfig>,
    pub cors: CorsConfig,
    pub relay: RelayConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Gateway listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin is accepted
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Relay tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Capacity of each connection's outbound event queue
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
    /// Worker id embedded in generated message ids (0-1023)
    #[serde(default)]
    pub worker_id: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            worker_id: 0,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-relay".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_outbound_buffer() -> usize {
    100
}

const MAX_WORKER_ID: u16 = 1023;

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|e| ConfigError::InvalidValue(key, e.to_string()))
                })
                .transpose()
        };

        let port = parsed("GATEWAY_PORT")?.ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?;
        let port: u16 = narrow("GATEWAY_PORT", port)?;

        let worker_id: u16 = narrow("WORKER_ID", parsed("WORKER_ID")?.unwrap_or(0))?;
        if worker_id > MAX_WORKER_ID {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                format!("{worker_id} exceeds {MAX_WORKER_ID}"),
            ));
        }

        let outbound_buffer = match parsed("RELAY_OUTBOUND_BUFFER")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue(
                    "RELAY_OUTBOUND_BUFFER",
                    "must be greater than zero".to_string(),
                ))
            }
            Some(n) => narrow("RELAY_OUTBOUND_BUFFER", n)?,
            None => default_outbound_buffer(),
        };

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS")?
                    .map(|n| narrow("DATABASE_MAX_CONNECTIONS", n))
                    .transpose()?
                    .unwrap_or_else(default_max_connections),
                min_connections: parsed("DATABASE_MIN_CONNECTIONS")?
                    .map(|n| narrow("DATABASE_MIN_CONNECTIONS", n))
                    .transpose()?
                    .unwrap_or_else(default_min_connections),
            }),
            None => None,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port,
            },
            database,
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            relay: RelayConfig {
                outbound_buffer,
                worker_id,
            },
        })
    }
}

/// Convert a parsed number into a narrower integer, rejecting values that do not fit
fn narrow<T: TryFrom<u64>>(key: &'static str, n: u64) -> Result<T, ConfigError> {
    T::try_from(n).map_err(|_| ConfigError::InvalidValue(key, format!("{n} is out of range")))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
