use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub recalculation: RecalculationConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let overrides_path = env::var("SCORING_OVERRIDES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let defaults = RecalculationConfig::default();
        let recalculation = RecalculationConfig {
            chunk_size: read_count("RECALC_CHUNK_SIZE", defaults.chunk_size)?,
            default_page_size: read_count("RECALC_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: read_count("RECALC_MAX_PAGE_SIZE", defaults.max_page_size)?,
        };

        let admin_tokens = match env::var("APP_ADMIN_TOKENS") {
            Ok(raw) => parse_admin_tokens(&raw)?,
            Err(_) => BTreeMap::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig { overrides_path },
            recalculation,
            auth: AuthConfig { admin_tokens },
        })
    }
}

fn read_count(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidCount { name }),
        },
        Err(_) => Ok(default),
    }
}

fn parse_admin_tokens(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut tokens = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (token, user) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidAdminToken(pair.to_string()))?;
        let (token, user) = (token.trim(), user.trim());
        if token.is_empty() || user.is_empty() {
            return Err(ConfigError::InvalidAdminToken(pair.to_string()));
        }
        tokens.insert(token.to_string(), user.to_string());
    }
    Ok(tokens)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the active scoring overrides document lives, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub overrides_path: Option<PathBuf>,
}

/// Batch sizing for the bulk recalculation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalculationConfig {
    pub chunk_size: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for RecalculationConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            default_page_size: 200,
            max_page_size: 1000,
        }
    }
}

/// Bearer tokens granted the admin role by the in-process role directory.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub admin_tokens: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCount { name: &'static str },
    InvalidAdminToken(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCount { name } => {
                write!(f, "{name} must be a positive integer")
            }
            ConfigError::InvalidAdminToken(pair) => {
                write!(f, "APP_ADMIN_TOKENS entry '{pair}' must look like token=user_id")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCount { .. }
            | ConfigError::InvalidAdminToken(_) => None,
        }
    }
}
