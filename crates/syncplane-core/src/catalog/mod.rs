//! Catalog documents and their protocol-version migration.

mod migration;
mod model;

pub use migration::{
    downgrade_catalog_if_needed, downgrade_schema, migrate_catalog, upgrade_catalog_if_needed,
    upgrade_schema, CatalogMigrationMode,
};
pub use model::{
    AirbyteCatalog, AirbyteStream, CatalogDocument, ConfiguredAirbyteCatalog,
    ConfiguredAirbyteStream, DestinationSyncMode, SyncMode,
};

use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Decodes a stored catalog document and normalizes it with the selected migration.
pub fn parse_catalog<C: CatalogDocument>(
    value: JsonValue,
    mode: CatalogMigrationMode,
) -> Result<C, AppError> {
    let catalog = C::from_json(value)?;
    migrate_catalog(mode, catalog).map_err(|e| {
        tracing::warn!(kind = C::KIND, error = %e, "catalog migration failed");
        e
    })
}
