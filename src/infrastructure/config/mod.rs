use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// API key value shipped in documentation templates; treated as unset
const TMDB_PLACEHOLDER_KEY: &str = "your_tmdb_api_key_here";

/// Runtime mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Local,
    Production,
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("Invalid runtime mode: {s}. Valid values: local, production")),
        }
    }
}

/// How authentication behaves when no credential provider is wired.
///
/// `Open` keeps the development fail-open behavior (requests proceed with a
/// placeholder identity); `Enforced` fails closed. The choice is an explicit
/// flag so the fail-open default stays visible and testable rather than an
/// implicit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Open,
    Enforced,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Enforced => write!(f, "enforced"),
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "enforced" => Ok(Self::Enforced),
            _ => Err(format!("Invalid auth mode: {s}. Valid values: open, enforced")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mode: RuntimeMode,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub tmdb: TmdbConfig,
    pub rate_limit: RateLimitSettings,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Shared secret for the token verifier; absent means no credential
    /// provider is configured
    pub token_secret: Option<String>,
}

/// Movie metadata provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Fixed-window rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_seconds: u64,
    pub trust_forwarded_headers: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origin allowlist; empty means allow any origin
    pub allowed_origins: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    /// Load configuration based on runtime mode
    ///
    /// # Errors
    /// Returns an error if environment values are invalid or the combination
    /// is unusable (enforced auth without a token secret)
    pub fn load() -> Result<Self, config::ConfigError> {
        let mode = std::env::var("RUN_MODE")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<RuntimeMode>()
            .map_err(config::ConfigError::Message)?;

        Self::load_for_mode(mode)
    }

    /// Load configuration for a specific runtime mode
    ///
    /// # Errors
    /// Returns an error if environment values are invalid or the combination
    /// is unusable (enforced auth without a token secret)
    pub fn load_for_mode(mode: RuntimeMode) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // For local mode only, load .env.local file (if it exists)
        if mode == RuntimeMode::Local {
            builder = builder.add_source(config::File::with_name(".env.local").required(false));
        }
        // Production mode relies solely on environment variables

        builder =
            builder.add_source(config::Environment::with_prefix("MOVIE_REVIEW").separator("__"));

        let (console_format, default_level) = match mode {
            RuntimeMode::Local => ("pretty", "debug"),
            RuntimeMode::Production => ("json", "info"),
        };

        let settings = builder
            .set_default("mode", mode.to_string())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("auth.mode", "open")?
            .set_default("auth.token_secret", None::<String>)?
            .set_default("tmdb.api_key", None::<String>)?
            .set_default("tmdb.base_url", "https://api.themoviedb.org/3")?
            .set_default("tmdb.timeout_seconds", 10)?
            .set_default("tmdb.max_retries", 2)?
            .set_default("tmdb.retry_delay_ms", 200)?
            .set_default("rate_limit.max_requests", 100)?
            .set_default("rate_limit.window_seconds", 900)?
            .set_default("rate_limit.trust_forwarded_headers", false)?
            .set_default("cors.allowed_origins", "http://localhost:3000,http://localhost:3001")?
            .set_default("logging.level", default_level)?
            .set_default("logging.format", console_format)?
            .build()?;

        let app_config: Self = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.mode == AuthMode::Enforced && !self.auth.has_token_secret() {
            return Err(config::ConfigError::Message(
                "auth.mode=enforced requires auth.token_secret".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Get the socket address for binding
    ///
    /// # Panics
    /// Panics if the host/port configuration cannot be parsed into a valid
    /// socket address
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().expect("Invalid host/port configuration")
    }
}

impl AuthConfig {
    /// Whether a usable token secret is configured
    #[must_use]
    pub fn has_token_secret(&self) -> bool {
        self.token_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl TmdbConfig {
    /// The configured API key, treating empty values and the documented
    /// placeholder as unset
    #[must_use]
    pub fn configured_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty() && *key != TMDB_PLACEHOLDER_KEY)
    }
}

impl CorsConfig {
    /// Parsed origin allowlist
    #[must_use]
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}
