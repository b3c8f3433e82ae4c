use syncplane_core::models::{
    Geography, NamespaceDefinitionType, NonBreakingChangesPreference, NotificationConfiguration,
    NotificationType, ScheduleType, StandardSync, Status,
};
use syncplane_core::{AppError, StoredEnum};
use uuid::Uuid;

use super::{decode_json_optional, parse_configured_catalog, required, ConverterContext};
use crate::db::rows::{ConnectionRow, NotificationConfigurationRow};

/// Builds a connection from its row, the ids of its operations and its notification settings.
///
/// The two notification flags are existence checks over `notifications`: true as soon as one
/// enabled row of the matching type exists.
pub fn build_standard_sync(
    row: ConnectionRow,
    operation_ids: Vec<Uuid>,
    notifications: &[NotificationConfigurationRow],
    ctx: &ConverterContext,
) -> Result<StandardSync, AppError> {
    let mut notify_schema_changes = false;
    let mut notify_schema_changes_by_email = false;
    for notification in notifications {
        match NotificationType::decode(&notification.notification_type)? {
            NotificationType::Webhook => notify_schema_changes |= notification.enabled,
            NotificationType::Email => notify_schema_changes_by_email |= notification.enabled,
        }
    }

    let namespace_definition = NamespaceDefinitionType::decode(required(
        row.namespace_definition.as_deref(),
        "connection.namespace_definition",
    )?)?;
    let geography = Geography::decode(required(row.geography.as_deref(), "connection.geography")?)?;
    let status = Status::decode_optional(row.status.as_deref())?;
    let schedule_type = ScheduleType::decode_optional(row.schedule_type.as_deref())?;
    let non_breaking_changes_preference = NonBreakingChangesPreference::decode_or(
        row.auto_propagation_status.as_deref(),
        NonBreakingChangesPreference::Ignore,
    )?;

    let catalog = parse_configured_catalog(required(row.catalog, "connection.catalog")?, ctx)?;

    Ok(StandardSync {
        connection_id: row.id,
        namespace_definition,
        namespace_format: row.namespace_format,
        prefix: row.prefix,
        source_id: row.source_id,
        destination_id: row.destination_id,
        name: required(row.name, "connection.name")?,
        catalog,
        field_selection_data: decode_json_optional(
            row.field_selection_data,
            "connection.field_selection_data",
        )?,
        status,
        schedule: decode_json_optional(row.schedule, "connection.schedule")?,
        manual: row.manual,
        schedule_type,
        schedule_data: decode_json_optional(row.schedule_data, "connection.schedule_data")?,
        operation_ids,
        resource_requirements: decode_json_optional(
            row.resource_requirements,
            "connection.resource_requirements",
        )?,
        source_catalog_id: row.source_catalog_id,
        breaking_change: row.breaking_change,
        geography,
        non_breaking_changes_preference,
        notify_schema_changes,
        notify_schema_changes_by_email,
    })
}

pub fn build_notification_configuration(
    row: NotificationConfigurationRow,
) -> Result<NotificationConfiguration, AppError> {
    Ok(NotificationConfiguration {
        id: row.id,
        connection_id: row.connection_id,
        notification_type: NotificationType::decode(&row.notification_type)?,
        enabled: row.enabled,
    })
}
