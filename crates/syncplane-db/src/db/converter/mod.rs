//! Row-to-domain mapping
//!
//! Every `build_*` function is a pure function of the row it receives (plus any dependent rows
//! passed in by the caller). Nothing here touches the pool. A mapping either produces a complete
//! domain value or fails:
//!
//! * a NULL mandatory column is [`AppError::MissingField`],
//! * an unknown enum token is [`AppError::EnumDecode`], unless the field documents a default
//!   for NULL,
//! * a JSON column that does not fit its typed structure is [`AppError::Decode`],
//! * a catalog that fails structural validation is [`AppError::CatalogValidation`].

mod actor;
mod connection;
mod organization;

pub use actor::{
    build_actor_catalog, build_actor_catalog_fetch_event, build_actor_catalog_with_updated_at,
    build_actor_definition_breaking_change, build_actor_definition_config_injection,
    build_actor_definition_version, build_standard_destination_definition,
    build_standard_source_definition,
};
pub use connection::{build_notification_configuration, build_standard_sync};
pub use organization::{
    build_organization, build_organization_user_permission, build_permission, build_sso_config,
    build_user,
};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use syncplane_core::catalog::{self, AirbyteCatalog, CatalogMigrationMode, ConfiguredAirbyteCatalog};
use syncplane_core::config::DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES;
use syncplane_core::{AppError, PersistenceConfig};

/// Read-time settings applied by the mappers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterContext {
    pub catalog_migration: CatalogMigrationMode,
    pub default_max_seconds_between_messages: i64,
}

impl Default for ConverterContext {
    fn default() -> Self {
        Self {
            catalog_migration: CatalogMigrationMode::default(),
            default_max_seconds_between_messages: DEFAULT_MAX_SECONDS_BETWEEN_MESSAGES,
        }
    }
}

impl From<&PersistenceConfig> for ConverterContext {
    fn from(config: &PersistenceConfig) -> Self {
        Self {
            catalog_migration: config.catalog_migration_mode,
            default_max_seconds_between_messages: config.default_max_seconds_between_messages,
        }
    }
}

/// Decodes a stored configured catalog and applies the configured migration.
pub fn parse_configured_catalog(
    value: JsonValue,
    ctx: &ConverterContext,
) -> Result<ConfiguredAirbyteCatalog, AppError> {
    catalog::parse_catalog(value, ctx.catalog_migration)
}

/// Decodes a stored discovered catalog and applies the configured migration.
pub fn parse_discovered_catalog(
    value: JsonValue,
    ctx: &ConverterContext,
) -> Result<AirbyteCatalog, AppError> {
    catalog::parse_catalog(value, ctx.catalog_migration)
}

fn required<T>(value: Option<T>, column: &'static str) -> Result<T, AppError> {
    value.ok_or_else(|| {
        tracing::warn!(column, "mandatory column is NULL");
        AppError::MissingField(column.to_string())
    })
}

fn decode_json<T: DeserializeOwned>(value: JsonValue, column: &'static str) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(column, error = %e, "stored JSON does not match its type");
        AppError::decode(column, e)
    })
}

/// SQL NULL and a JSON `null` document both map to `None`.
fn decode_json_optional<T: DeserializeOwned>(
    value: Option<JsonValue>,
    column: &'static str,
) -> Result<Option<T>, AppError> {
    value
        .filter(|v| !v.is_null())
        .map(|v| decode_json(v, column))
        .transpose()
}
