/// Configuration management for the API server
///
/// Configuration is read once at startup from environment variables (after
/// loading `.env` if present) and is immutable afterwards.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECONDS`: Pool acquire timeout (default: 5)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 bytes (required)
/// - `JWT_TTL_SECONDS`: Credential lifetime (default: 3600, at most one year)
/// - `PASSWORD_HASH_MEMORY_KIB` / `PASSWORD_HASH_ITERATIONS` / `PASSWORD_HASH_PARALLELISM`:
///   Argon2id work factor (default: 65536 / 3 / 4, floor: 19456 / 2 / 1)
/// - `SEED_DEMO_DATA`: Create a demo user at startup (default: false)
/// - `SEED_USER_EMAIL` / `SEED_USER_PASSWORD`: Demo user credentials
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskgate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, fmt, str::FromStr};

use axum::http::HeaderValue;

use taskgate_shared::{
    auth::{
        jwt::{SigningSecret, TokenError},
        password::{HashParams, PasswordError},
    },
    db::pool::DatabaseConfig,
};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// A variable could not be parsed
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// JWT secret rejected
    #[error("JWT_SECRET is invalid: {0}")]
    Secret(#[from] TokenError),

    /// Password work factor rejected
    #[error("Password hash parameters are invalid: {0}")]
    HashParams(#[from] PasswordError),
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub password: HashParams,
    pub seed: SeedConfig,
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<HeaderValue>,

    /// Requests running longer than this are answered with a 504 timeout body
    pub request_timeout_seconds: u64,
}

/// Storage backend selection
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// PostgreSQL through a connection pool
    Postgres(DatabaseConfig),

    /// Process-local store; data is lost on restart
    Memory,
}

/// Longest accepted credential lifetime (one year)
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: SigningSecret,

    /// Credential lifetime in seconds
    pub ttl_seconds: i64,
}

/// Demo data seeding
#[derive(Clone)]
pub struct SeedConfig {
    pub enabled: bool,
    pub email: String,
    pub password: Option<String>,
}

impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("enabled", &self.enabled)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is
    /// invalid. A missing or short `JWT_SECRET` is always fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Ok(Self::from_lookup(|name| env::var(name).ok())?)
    }

    /// Builds configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api = ApiConfig {
            host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "API_PORT", 8080)?,
            cors_origins: parse_cors_origins(
                &get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()),
            )?,
            request_timeout_seconds: parse_or(&get, "REQUEST_TIMEOUT_SECONDS", 30)?,
        };

        let storage = match get("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StorageConfig::Postgres(DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_seconds: parse_or(&get, "DATABASE_ACQUIRE_TIMEOUT_SECONDS", 5)?,
                ..DatabaseConfig::default()
            }),
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    reason: format!("unknown backend '{}', expected postgres or memory", other),
                })
            }
        };

        let jwt = JwtConfig {
            secret: SigningSecret::new(get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?)?,
            ttl_seconds: parse_or(&get, "JWT_TTL_SECONDS", 3600)?,
        };
        if !(1..=MAX_TTL_SECONDS).contains(&jwt.ttl_seconds) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_SECONDS",
                reason: format!("must be between 1 and {}", MAX_TTL_SECONDS),
            });
        }

        let defaults = HashParams::default();
        let password = HashParams {
            memory_kib: parse_or(&get, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&get, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };
        password.validate()?;

        let seed = SeedConfig {
            enabled: parse_or(&get, "SEED_DEMO_DATA", false)?,
            email: get("SEED_USER_EMAIL").unwrap_or_else(|| "demo@example.com".to_string()),
            password: get("SEED_USER_PASSWORD"),
        };
        if seed.enabled && seed.password.is_none() {
            return Err(ConfigError::Missing("SEED_USER_PASSWORD"));
        }

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    reason: format!("unknown format '{}', expected pretty or json", other),
                })
            }
        };

        Ok(Self {
            api,
            storage,
            jwt,
            password,
            seed,
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS allows any origin
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Parses a comma-separated origin list; each entry is `*` or `scheme://host[:port]`
fn parse_cors_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let invalid = |reason: &str| ConfigError::Invalid {
                name: "CORS_ORIGINS",
                reason: format!("'{}' {}", origin, reason),
            };

            if origin != "*" {
                let host = origin
                    .strip_prefix("https://")
                    .or_else(|| origin.strip_prefix("http://"))
                    .ok_or_else(|| invalid("must start with http:// or https://"))?;
                if host.is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
                    return Err(invalid("must be scheme://host[:port] with no path"));
                }
            }

            HeaderValue::from_str(origin).map_err(|_| invalid("is not a valid header value"))
        })
        .collect()
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
