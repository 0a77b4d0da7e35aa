/// Configuration management for the API server
///
/// Configuration is read once at startup from environment variables (and a
/// `.env` file if present), validated, and then shared read-only behind an
/// `Arc` in [`AppState`](crate::app::AppState). Nothing mutates it at runtime.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `CORS_ALLOWED_ORIGINS`: Comma-separated origin allowlist
/// - `CORS_DEV_BYPASS`: Mirror every origin (default: true in development)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECONDS`: Wait for a free connection (default: 5)
/// - `DATABASE_RUN_MIGRATIONS`: Apply embedded migrations at startup (default: true)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `JWT_ACCESS_TTL_HOURS`: Access token lifetime (default: 24)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
///
/// # Example
///
/// ```no_run
/// use tenantboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use axum::http::HeaderValue;
use std::env;
use tenantboard_shared::db::pool::DatabaseConfig as PoolConfig;

/// Origins allowed when `CORS_ALLOWED_ORIGINS` is not set
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://127.0.0.1:3000,http://frontend:3000";

/// Minimum JWT secret length in characters
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::invalid(
                "APP_ENV",
                format!("expected development or production, got '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl ApiConfig {
    /// HSTS and strict CORS are tied to this
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Also bounds how long `/api/health` waits on an unreachable database
    pub acquire_timeout_seconds: u64,

    /// Apply embedded migrations before serving
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Pool settings for [`tenantboard_shared::db::pool`]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            acquire_timeout_seconds: self.acquire_timeout_seconds,
            ..PoolConfig::default()
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in hours
    pub access_ttl_hours: i64,
}

impl JwtConfig {
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.access_ttl_hours)
    }
}

/// Cross-origin policy
///
/// Requests without an `Origin` header are always served. Browsers calling
/// from an origin outside the list get no CORS headers back and block the
/// response.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API with credentials
    pub allowed_origins: Vec<HeaderValue>,

    /// Mirror any origin back; development only
    pub dev_bypass: bool,
}

impl CorsConfig {
    /// Parses a comma-separated origin list
    ///
    /// Each entry must be `http://` or `https://` followed by a host, with no
    /// path and no trailing slash. Empty entries are skipped.
    pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                let host = origin
                    .strip_prefix("http://")
                    .or_else(|| origin.strip_prefix("https://"))
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            "CORS_ALLOWED_ORIGINS",
                            format!("'{}' must start with http:// or https://", origin),
                        )
                    })?;

                if host.is_empty() || host.contains('/') {
                    return Err(ConfigError::invalid(
                        "CORS_ALLOWED_ORIGINS",
                        format!("'{}' must be a bare origin without a path", origin),
                    ));
                }

                HeaderValue::from_str(origin).map_err(|_| {
                    ConfigError::invalid(
                        "CORS_ALLOWED_ORIGINS",
                        format!("'{}' is not a valid header value", origin),
                    )
                })
            })
            .collect()
    }
}

impl Config {
    /// Loads and validates configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value fails
    /// validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::default(),
        };

        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 5000u16)?;

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let acquire_timeout_seconds = parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECONDS", 5u64)?;
        let run_migrations = parse_bool_or(&lookup, "DATABASE_RUN_MIGRATIONS", true)?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let access_ttl_hours = parse_or(&lookup, "JWT_ACCESS_TTL_HOURS", 24i64)?;

        let allowed_origins = CorsConfig::parse_origins(
            &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )?;
        let dev_bypass = parse_bool_or(
            &lookup,
            "CORS_DEV_BYPASS",
            environment == Environment::Development,
        )?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "LOG_FORMAT",
                    format!("expected pretty or json, got '{}'", other),
                ))
            }
        };

        let config = Self {
            api: ApiConfig {
                host,
                port,
                environment,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                acquire_timeout_seconds,
                run_migrations,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_hours,
            },
            cors: CorsConfig {
                allowed_origins,
                dev_bypass,
            },
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.chars().count() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("must be at least {} characters long", MIN_JWT_SECRET_LENGTH),
            ));
        }

        if self.jwt.access_ttl_hours <= 0 {
            return Err(ConfigError::invalid("JWT_ACCESS_TTL_HOURS", "must be positive"));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "DATABASE_MAX_CONNECTIONS",
                "must be at least 1",
            ));
        }

        if self.database.acquire_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
                "must be at least 1",
            ));
        }

        if self.api.is_production() && self.cors.dev_bypass {
            return Err(ConfigError::invalid(
                "CORS_DEV_BYPASS",
                "cannot be enabled in production",
            ));
        }

        if !self.cors.dev_bypass && self.cors.allowed_origins.is_empty() {
            return Err(ConfigError::invalid(
                "CORS_ALLOWED_ORIGINS",
                "must list at least one origin when the dev bypass is off",
            ));
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(key, e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(false),
        Some(v) => Err(ConfigError::invalid(
            key,
            format!("expected true or false, got '{}'", v),
        )),
    }
}
