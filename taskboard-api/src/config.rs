/// Configuration management for the API server
///
/// Loads configuration from environment variables (with `.env` support for
/// development) into a type-safe struct. The server refuses to start on
/// missing or weak secrets.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 3000)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_ACCESS_SECRET`: access-token signing secret (required, >= 32 chars)
/// - `JWT_REFRESH_SECRET`: refresh-token signing secret (required, >= 32 chars)
/// - `JWT_ACCESS_TTL_MINUTES`: access token lifetime (default: 15)
/// - `JWT_REFRESH_TTL_DAYS`: refresh token lifetime (default: 7)
/// - `CORS_ORIGINS`: comma-separated allow-list ("*" for permissive dev mode)
/// - `APP_ENV`: "production" enables production behavior (HSTS)
/// - `RUST_LOG`: log filter (default: info)

use chrono::Duration;
use std::env;
use taskboard_shared::{auth::jwt::TokenConfig, db::pool::DatabaseConfig};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token signing configuration
    pub tokens: TokenConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// CORS origin allow-list; fixed at startup, never mutated
    pub cors_origins: Vec<String>,

    /// Whether we are running in production
    pub production: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric
    /// variable fails to parse, or a signing secret is shorter than 32
    /// characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let access_secret = required_secret("JWT_ACCESS_SECRET")?;
        let refresh_secret = required_secret("JWT_REFRESH_SECRET")?;

        let access_ttl_minutes = env::var("JWT_ACCESS_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<i64>()?;
        let refresh_ttl_days = env::var("JWT_REFRESH_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..DatabaseConfig::default()
            },
            tokens: TokenConfig {
                access_secret,
                refresh_secret,
                access_ttl: Duration::minutes(access_ttl_minutes),
                refresh_ttl: Duration::days(refresh_ttl_days),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn required_secret(name: &str) -> anyhow::Result<String> {
    let value =
        env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable is required", name))?;

    if value.len() < 32 {
        anyhow::bail!("{} must be at least 32 characters long", name);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                ..DatabaseConfig::default()
            },
            tokens: TokenConfig::new(
                "test-access-secret-at-least-32-bytes!!",
                "test-refresh-secret-at-least-32-bytes!",
            ),
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample_config().bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_default_token_lifetimes() {
        let config = sample_config();
        assert_eq!(config.tokens.access_ttl, Duration::minutes(15));
        assert_eq!(config.tokens.refresh_ttl, Duration::days(7));
    }
}
