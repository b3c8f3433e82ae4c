//! PostgreSQL persistence for the SyncPlane control plane.

pub mod db;

pub use db::{
    ActorCatalogRepository, ActorDefinitionRepository, ConnectionRepository, ConverterContext,
    OrganizationRepository, PermissionRepository, TransactionGuard, UserRepository,
};
pub use sqlx::PgPool;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use syncplane_core::PersistenceConfig;

/// Connect to the database described by `config`, running pending migrations when
/// `run_migrations` is set.
pub async fn connect(config: &PersistenceConfig) -> Result<PgPool> {
    config.validate()?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        environment = %config.environment,
        production = config.is_production(),
        "Database connected successfully"
    );

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Apply the migrations under the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
