/// Configuration management for the web server
///
/// Configuration is read from environment variables (and a `.env` file when
/// present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `SECRET_KEY`: Key the session cookie is signed with, at least 32 characters (required)
/// - `DEBUG`: `true`/`1`/`yes` enables development mode (default: false)
/// - `HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8000)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_EXPIRY_SECONDS`: Inactivity before a session expires (default: two weeks)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use aishop_web::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

/// Minimum accepted `SECRET_KEY` length
pub const MIN_SECRET_KEY_LENGTH: usize = 32;

/// Two weeks, in seconds
pub const DEFAULT_SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub session: SessionConfig,

    /// Development mode: session cookie is not marked Secure and HSTS is off
    pub debug: bool,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret the session cookie signing key is derived from
    pub secret_key: String,

    /// Inactivity period after which a session expires
    pub expiry_seconds: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_key", &"<redacted>")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

/// Interprets a `DEBUG`-style flag
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a number does not
    /// parse, or `SECRET_KEY` is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let secret_key = env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        let expiry_seconds = match env::var("SESSION_EXPIRY_SECONDS") {
            Ok(value) => value.parse::<i64>()?,
            Err(_) => DEFAULT_SESSION_EXPIRY_SECONDS,
        };

        let debug = env::var("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret_key,
                expiry_seconds,
            },
            debug,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but are still unusable
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret_key.chars().count() < MIN_SECRET_KEY_LENGTH {
            anyhow::bail!(
                "SECRET_KEY must be at least {} characters long",
                MIN_SECRET_KEY_LENGTH
            );
        }

        if self.session.expiry_seconds <= 0 {
            anyhow::bail!("SESSION_EXPIRY_SECONDS must be positive");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Session cookies carry the Secure attribute outside development mode
    pub fn secure_cookies(&self) -> bool {
        !self.debug
    }
}
