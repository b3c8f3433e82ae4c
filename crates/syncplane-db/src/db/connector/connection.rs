use sqlx::{PgPool, Postgres};
use syncplane_core::models::{NotificationConfiguration, StandardSync};
use syncplane_core::AppError;
use uuid::Uuid;

use crate::db::converter::{build_notification_configuration, build_standard_sync, ConverterContext};
use crate::db::rows::{ConnectionRow, NotificationConfigurationRow};

/// Repository for connections (`StandardSync`)
#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
    ctx: ConverterContext,
}

impl ConnectionRepository {
    pub fn new(pool: PgPool, ctx: ConverterContext) -> Self {
        Self { pool, ctx }
    }

    /// Load a connection with its operation ids, notification flags and auto-propagation
    /// preference. The stored catalog goes through the configured protocol migration.
    #[tracing::instrument(skip(self), fields(db.table = "connection", db.operation = "select", db.record_id = %id))]
    pub async fn get_standard_sync(&self, id: Uuid) -> Result<Option<StandardSync>, AppError> {
        let row = sqlx::query_as::<Postgres, ConnectionRow>(
            r#"
            SELECT c.id, c.namespace_definition, c.namespace_format, c.prefix, c.source_id,
                   c.destination_id, c.name, c.catalog, c.status, c.schedule, c.manual,
                   c.schedule_type, c.schedule_data, c.resource_requirements,
                   c.source_catalog_id, c.breaking_change, c.geography, c.field_selection_data,
                   sm.auto_propagation_status
            FROM connection c
            LEFT JOIN schema_management sm ON sm.connection_id = c.id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let operation_ids = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT operation_id FROM connection_operation WHERE connection_id = $1 ORDER BY operation_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let notifications = self.fetch_notification_rows(id).await?;

        build_standard_sync(row, operation_ids, &notifications, &self.ctx).map(Some)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notification_configuration", db.operation = "select"))]
    pub async fn list_notification_configurations(
        &self,
        connection_id: Uuid,
    ) -> Result<Vec<NotificationConfiguration>, AppError> {
        self.fetch_notification_rows(connection_id)
            .await?
            .into_iter()
            .map(build_notification_configuration)
            .collect()
    }

    async fn fetch_notification_rows(
        &self,
        connection_id: Uuid,
    ) -> Result<Vec<NotificationConfigurationRow>, AppError> {
        let rows = sqlx::query_as::<Postgres, NotificationConfigurationRow>(
            r#"
            SELECT id, connection_id, notification_type, enabled
            FROM notification_configuration
            WHERE connection_id = $1
            ORDER BY id
            "#,
        )
        .bind(connection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
