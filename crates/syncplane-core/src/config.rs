//! Configuration module
//!
//! Settings for opening the metadata store and for the read-time behaviour of the record mapper.

use std::env;

use crate::catalog::CatalogMigrationMode;
use crate::enums::{describe_tokens, StoredEnum};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
/// Three hours, used for source definitions stored without a heartbeat threshold.
pub const DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES: i64 = 3 * 60 * 60;

/// Persistence configuration shared by the CLI binaries and tests
#[derive(Clone, Debug)]
pub struct PersistenceConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub catalog_migration_mode: CatalogMigrationMode,
    pub default_max_seconds_between_messages: i64,
    pub run_migrations: bool,
}

impl PersistenceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let catalog_migration_mode = match lookup("CATALOG_MIGRATION_MODE") {
            Some(raw) => CatalogMigrationMode::decode(raw.trim()).map_err(|_| {
                anyhow::anyhow!(
                    "CATALOG_MIGRATION_MODE must be one of {}, got '{}'",
                    describe_tokens::<CatalogMigrationMode>(),
                    raw
                )
            })?,
            None => CatalogMigrationMode::default(),
        };

        let default_max_seconds_between_messages = match lookup("DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES")
        {
            Some(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES must be a valid number")
            })?,
            None => DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES,
        };

        Ok(Self {
            database_url,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            catalog_migration_mode,
            default_max_seconds_between_messages,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        if self.default_max_seconds_between_messages <= 0 {
            return Err(anyhow::anyhow!(
                "DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES must be greater than 0"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            PersistenceConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://x/db")]))
                .unwrap();
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.db_timeout_seconds, 30);
        assert_eq!(config.environment, "development");
        assert_eq!(config.catalog_migration_mode, CatalogMigrationMode::Downgrade);
        assert_eq!(config.default_max_seconds_between_messages, 10800);
        assert!(config.run_migrations);
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_database_url() {
        let err = PersistenceConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = PersistenceConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/db"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("ENVIRONMENT", "prod"),
            ("CATALOG_MIGRATION_MODE", "upgrade"),
            ("DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES", "60"),
            ("RUN_MIGRATIONS", "FALSE"),
        ]))
        .unwrap();
        assert_eq!(config.db_max_connections, 5);
        assert!(config.is_production());
        assert_eq!(config.catalog_migration_mode, CatalogMigrationMode::Upgrade);
        assert_eq!(config.default_max_seconds_between_messages, 60);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_unknown_migration_mode_lists_tokens() {
        let err = PersistenceConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://x/db"),
            ("CATALOG_MIGRATION_MODE", "sideways"),
        ]))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"downgrade\""));
        assert!(msg.contains("sideways"));
    }

    #[test]
    fn test_validate_rejects_non_postgres_url() {
        let config =
            PersistenceConfig::from_lookup(lookup_from(&[("DATABASE_URL", "mysql://x/db")]))
                .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let config = PersistenceConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://x/db"),
            ("DB_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }
}
