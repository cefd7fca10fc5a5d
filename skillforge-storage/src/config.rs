//! Store selection and database connection settings.

use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime, Timeouts};
use skillforge_core::{ConfigError, StorageError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Which store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" | "inmemory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "SKILLFORGE_STORE".to_string(),
                value: other.to_string(),
                reason: "expected 'postgres' or 'memory'".to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Postgres => f.write_str("postgres"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection wait timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "skillforge".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SKILLFORGE_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SKILLFORGE_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("SKILLFORGE_DB_NAME")
                .unwrap_or_else(|_| "skillforge".to_string()),
            user: std::env::var("SKILLFORGE_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("SKILLFORGE_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SKILLFORGE_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("SKILLFORGE_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> Result<Pool, StorageError> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts = Timeouts {
            wait: Some(self.timeout),
            create: Some(self.timeout),
            recycle: Some(self.timeout),
        };
        cfg.pool = Some(pool_cfg);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StorageError::Backend {
                reason: format!("Failed to create pool: {}", e),
            })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("max_size", &self.max_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// STORE CONFIGURATION
// ============================================================================

/// Store selection plus database settings.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub db: DbConfig,
}

impl StoreConfig {
    /// Load from `SKILLFORGE_STORE` (default: postgres) and the
    /// `SKILLFORGE_DB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("SKILLFORGE_STORE") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => StoreBackend::default(),
        };
        Ok(Self {
            backend,
            db: DbConfig::from_env(),
        })
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            db: DbConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "skillforge");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_db_config_debug_redacts_password() {
        let config = DbConfig {
            password: "hunter2".to_string(),
            ..DbConfig::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!("PostgreSQL".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() {
        // deadpool does not connect until the first checkout.
        assert!(DbConfig::default().create_pool().is_ok());
    }
}
