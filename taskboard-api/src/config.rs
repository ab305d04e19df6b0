/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file
/// loaded first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `STORE_BACKEND`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool upper bound (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: Pool lower bound (default: 2)
/// - `RUN_MIGRATIONS`: Apply migrations on startup (default: true)
/// - `AUTH_JWT_SECRET`: Shared HS256 secret, at least 32 characters (required)
/// - `AUTH_ISSUER`: Expected token issuer (default: taskboard)
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for plain text
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Minimum accepted length of `AUTH_JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Token verification configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` = any)
    pub cors_origins: Vec<String>,

    /// Emit logs as JSON
    pub json_logs: bool,
}

/// Which [`taskboard_shared::store::DocumentStore`] to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown STORE_BACKEND '{}', expected postgres or memory", other),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL (empty for the memory backend)
    pub database_url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Minimum number of idle connections
    pub min_connections: u32,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

/// Token verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret
    ///
    /// Must match the identity provider and be at least 32 characters.
    pub jwt_secret: String,

    /// Expected `iss` claim
    pub issuer: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let json_logs = var("LOG_FORMAT", "text").eq_ignore_ascii_case("json");

        let backend: StoreBackend = var("STORE_BACKEND", "postgres").parse()?;

        let database_url = match (backend, lookup("DATABASE_URL")) {
            (_, Some(url)) => url,
            (StoreBackend::Memory, None) => String::new(),
            (StoreBackend::Postgres, None) => {
                anyhow::bail!("DATABASE_URL environment variable is required")
            }
        };

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;
        let min_connections = var("DATABASE_MIN_CONNECTIONS", "2").parse::<u32>()?;
        if min_connections > max_connections {
            anyhow::bail!("DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS");
        }

        let run_migrations = parse_bool("RUN_MIGRATIONS", &var("RUN_MIGRATIONS", "true"))?;

        let jwt_secret = lookup("AUTH_JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("AUTH_JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "AUTH_JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                json_logs,
            },
            store: StoreConfig {
                backend,
                database_url,
                max_connections,
                min_connections,
                run_migrations,
            },
            auth: AuthConfig {
                jwt_secret,
                issuer: var("AUTH_ISSUER", "taskboard"),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True if any origin may call the API
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("AUTH_JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.cors_permissive());
        assert!(!config.api.json_logs);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.store.max_connections, 10);
        assert_eq!(config.store.min_connections, 2);
        assert!(config.store.run_migrations);
        assert_eq!(config.auth.issuer, "taskboard");
    }

    #[test]
    fn test_bind_address() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_memory_backend_needs_no_database_url() {
        let config = load(&[("STORE_BACKEND", "memory"), ("AUTH_JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.database_url.is_empty());
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let err = load(&[("AUTH_JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_secret_required_and_long_enough() {
        let err = load(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(err.to_string().contains("AUTH_JWT_SECRET"));

        let err = load(&[("STORE_BACKEND", "memory"), ("AUTH_JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_cors_origins_list() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", SECRET),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();

        assert!(!config.cors_permissive());
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("STORE_BACKEND", "mongo"), ("AUTH_JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", SECRET),
            ("API_PORT", "not-a-port"),
        ])
        .is_err());
        assert!(load(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", SECRET),
            ("RUN_MIGRATIONS", "maybe"),
        ])
        .is_err());
        assert!(load(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_JWT_SECRET", SECRET),
            ("DATABASE_MIN_CONNECTIONS", "20"),
        ])
        .is_err());
    }
}
