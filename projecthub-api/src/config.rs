/// Configuration management for the API server
///
/// Configuration is read from environment variables, after loading a `.env`
/// file if one exists.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `API_PRODUCTION`: Enables HSTS (default: false)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `NOTIFICATION_POLL_INTERVAL_SECS`: Advertised poll interval (default: 30)
///
/// # Example
///
/// ```no_run
/// use projecthub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Adds HSTS to every response
    pub production: bool,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Sent to clients as `X-Poll-Interval`
    pub poll_interval_secs: u64,
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?;

        let production = lookup("API_PRODUCTION")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cors_origins = parse_origins(&lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let poll_interval_secs = lookup("NOTIFICATION_POLL_INTERVAL_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("Invalid NOTIFICATION_POLL_INTERVAL_SECS: {}", e))?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            notifications: NotificationConfig { poll_interval_secs },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(!config.api.production);
        assert!(config.allows_any_origin());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.notifications.poll_interval_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("API_PRODUCTION", "true"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("JWT_SECRET", SECRET),
            ("NOTIFICATION_POLL_INTERVAL_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.api.production);
        assert_eq!(config.api.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert!(!config.allows_any_origin());
        assert_eq!(config.database.max_connections, 25);
        assert_eq!(config.notifications.poll_interval_secs, 5);
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", "short")])
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(load(&[
            ("API_PORT", "not-a-port"),
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .is_err());
    }
}
