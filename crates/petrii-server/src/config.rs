//! Configuration management

use std::{fmt, str::FromStr};

use crate::storage::config::StorageConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/petrii";

/// Database URL that selects the in-process stores.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Session tokens are valid for 30 days.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Longest accepted session lifetime (about ten years).
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Minimum signing secret length accepted at startup.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Default request body cap for uploads (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default cap on a persisted dataset record, metadata plus indexed text (16 MiB).
pub const DEFAULT_MAX_RECORD_BYTES: usize = 16 * 1024 * 1024;

/// Display name for the seeded administrator.
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub storage: StorageConfig,
    /// Administrator account created at startup when missing
    pub admin: Option<AdminSeed>,
}

/// Server-specific configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Session signing configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_days: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("session_ttl_days", &self.session_ttl_days)
            .finish()
    }
}

/// Upload size limits
#[derive(Debug, Clone, Copy)]
pub struct UploadConfig {
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Largest persisted dataset record
    pub max_record_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }
}

/// Bootstrap administrator credentials
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let admin = match (env_string("ADMIN_EMAIL"), env_string("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                name: env_string("ADMIN_NAME").unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string()),
                email,
                password,
            }),
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")
            },
            (None, None) => None,
        };

        let config = Config {
            server: ServerConfig {
                host: env_string("PETRII_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("PETRII_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "PETRII_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", false),
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
                session_ttl_days: env_or("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS),
            },
            uploads: UploadConfig {
                max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                max_record_bytes: env_or("MAX_RECORD_BYTES", DEFAULT_MAX_RECORD_BYTES),
            },
            storage: StorageConfig::from_env()?,
            admin,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_JWT_SECRET_LEN);
        }

        if self.auth.session_ttl_days <= 0 || self.auth.session_ttl_days > MAX_SESSION_TTL_DAYS {
            anyhow::bail!("SESSION_TTL_DAYS must be between 1 and {}", MAX_SESSION_TTL_DAYS);
        }

        if self.uploads.max_upload_bytes == 0 || self.uploads.max_record_bytes == 0 {
            anyhow::bail!("Upload limits must be greater than 0");
        }

        if let Some(admin) = &self.admin {
            if !admin.email.contains('@') {
                anyhow::bail!("ADMIN_EMAIL is not a valid email address");
            }
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.cors.allow_credentials && self.cors.allowed_origins.iter().any(|o| o == "*") {
            anyhow::bail!("CORS credentials cannot be combined with a wildcard origin");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            },
            uploads: UploadConfig::default(),
            storage: StorageConfig::default(),
            admin: None,
        }
    }
}
