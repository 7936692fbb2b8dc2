/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://tasktally.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters
///   (default: random per process)
/// - `JWT_TTL_HOURS`: Token lifetime (default: 24)
/// - `ADMIN_EMAIL` / `ADMIN_PASS` / `ADMIN_NAME`: Bootstrap admin account
/// - `RUST_LOG`: Log filter
/// - `LOG_FORMAT`: `text` or `json` (default: text)
///
/// # Example
///
/// ```no_run
/// use tasktally_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tasktally_shared::services::accounts::AdminSeed;

/// Minimum accepted length for a configured JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Bootstrap admin account
    pub admin: AdminConfig,

    /// Log output
    pub log: LogConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Text,

    /// One JSON object per event
    Json,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    #[serde(skip_serializing)]
    pub secret: String,

    /// Whether the secret was generated at startup
    pub generated: bool,

    /// Access token lifetime in hours
    pub ttl_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("generated", &self.generated)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Bootstrap admin configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub name: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl AdminConfig {
    pub fn seed(&self) -> AdminSeed {
        AdminSeed {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or if
    /// `JWT_SECRET` is set but shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let api_port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is not a number: {}", e))?;

        let ttl_hours = var_or("JWT_TTL_HOURS", "24")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_TTL_HOURS is not a number: {}", e))?;
        if ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS must be positive");
        }

        let log_format = match var_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        let (jwt_secret, generated) = match var("JWT_SECRET") {
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                anyhow::bail!(
                    "JWT_SECRET must be at least {} characters long",
                    MIN_JWT_SECRET_LEN
                );
            }
            Some(secret) => (secret, false),
            None => (generate_secret(), true),
        };

        Ok(Self {
            api: ApiConfig {
                host: var_or("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins: var_or("API_CORS_ORIGINS", "*")
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            },
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "sqlite://tasktally.db"),
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                generated,
                ttl_hours,
            },
            admin: AdminConfig {
                email: var_or("ADMIN_EMAIL", "admin@example.com"),
                password: var_or("ADMIN_PASS", "admin123"),
                name: var_or("ADMIN_NAME", "Admin"),
            },
            log: LogConfig { format: log_format },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Access token lifetime
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt.ttl_hours)
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.url, "sqlite://tasktally.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.ttl_hours, 24);
        assert_eq!(config.admin.email, "admin@example.com");
        assert_eq!(config.admin.password, "admin123");
        assert_eq!(config.admin.name, "Admin");
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_log_format() {
        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.log.format, LogFormat::Json);

        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_generated_secret() {
        let a = config_from(&[]).unwrap();
        let b = config_from(&[]).unwrap();

        assert!(a.jwt.generated);
        assert!(a.jwt.secret.len() >= MIN_JWT_SECRET_LEN);
        assert_ne!(a.jwt.secret, b.jwt.secret);
    }

    #[test]
    fn test_configured_secret() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let config = config_from(&[("JWT_SECRET", secret)]).unwrap();

        assert!(!config.jwt.generated);
        assert_eq!(config.jwt.secret, secret);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(config_from(&[("JWT_SECRET", "too-short")]).is_err());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = config_from(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_EMAIL", "root@example.org"),
            ("API_CORS_ORIGINS", "http://localhost:3000, https://tally.example.org"),
        ])
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.admin.seed().email, "root@example.org");
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:3000", "https://tally.example.org"]
        );

        assert!(config_from(&[("API_PORT", "eighty")]).is_err());
        assert!(config_from(&[("JWT_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[("ADMIN_PASS", "hunter2-but-longer")]).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter2-but-longer"));
        assert!(!debug.contains(&config.jwt.secret));
    }
}
