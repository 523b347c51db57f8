/// Configuration management for the API server
///
/// Loaded from environment variables, with a `.env` file honoured in
/// development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 100)
/// - `DATABASE_MIN_CONNECTIONS`: Idle connections kept open (default: 1)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECONDS`: Wait for a free connection (default: 30)
/// - `DATABASE_CREATE_IF_MISSING`: Create the database at startup (default: false)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT` or `PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `JWT_SECRET`: Secret shared with the identity provider (required)
/// - `JWT_ISSUER`: Expected token issuer (default: hearth)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use hearth_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

use hearth_shared::db::pool::DatabaseConfig as PoolConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
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

    /// Production mode (adds HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Minimum number of idle connections
    pub min_connections: u32,

    /// Seconds to wait for a connection before failing the request
    pub acquire_timeout_seconds: u64,

    /// Create the database before connecting if it doesn't exist
    pub create_if_missing: bool,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key the identity provider signs tokens with
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Required `iss` claim
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

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = lookup("API_PORT")
            .or_else(|| lookup("PORT"))
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT must be a port number: {}", e))?;

        let cors_origins = parse_origins(&var_or("CORS_ORIGINS", "*"));
        let production = parse_bool("PRODUCTION", &var_or("PRODUCTION", "false"))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "100").parse::<u32>()?;
        let min_connections = var_or("DATABASE_MIN_CONNECTIONS", "1").parse::<u32>()?;
        let acquire_timeout_seconds =
            var_or("DATABASE_ACQUIRE_TIMEOUT_SECONDS", "30").parse::<u64>()?;
        let create_if_missing = parse_bool(
            "DATABASE_CREATE_IF_MISSING",
            &var_or("DATABASE_CREATE_IF_MISSING", "false"),
        )?;

        if min_connections > max_connections {
            anyhow::bail!("DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS");
        }

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_issuer = var_or("JWT_ISSUER", "hearth");

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                acquire_timeout_seconds,
                create_if_missing,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: jwt_issuer,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for [`hearth_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout_seconds: self.database.acquire_timeout_seconds,
            ..PoolConfig::default()
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => anyhow::bail!("{} must be true or false, got {:?}", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                create_if_missing: false,
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                issuer: "hearth".to_string(),
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(!config.api.production);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.acquire_timeout_seconds, 30);
        assert!(!config.database.create_if_missing);
        assert_eq!(config.jwt.issuer, "hearth");
    }

    #[test]
    fn test_port_fallback_and_origins() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", SECRET),
            ("PORT", "8081"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("PRODUCTION", "true"),
        ]))
        .unwrap();

        assert_eq!(config.api.port, 8081);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.api.production);
    }

    #[test]
    fn test_required_variables() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_create_if_missing_flag() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", SECRET),
            ("DATABASE_CREATE_IF_MISSING", "yes"),
        ]))
        .unwrap();
        assert!(config.database.create_if_missing);

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", SECRET),
            ("DATABASE_CREATE_IF_MISSING", "sometimes"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_CREATE_IF_MISSING"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", "short"),
        ]));

        assert!(result.is_err());
    }

    #[test]
    fn test_pool_config() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/hearth"),
            ("JWT_SECRET", SECRET),
            ("DATABASE_MAX_CONNECTIONS", "5"),
            ("DATABASE_MIN_CONNECTIONS", "0"),
        ]))
        .unwrap();

        let pool = config.pool_config();
        assert_eq!(pool.url, "postgresql://localhost/hearth");
        assert_eq!(pool.max_connections, 5);
        assert_eq!(pool.min_connections, 0);
        assert!(pool.test_before_acquire);
    }
}
