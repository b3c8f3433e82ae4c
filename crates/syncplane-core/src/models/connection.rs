use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ConfiguredAirbyteCatalog;

crate::stored_enum! {
    /// Where destination namespaces come from
    pub enum NamespaceDefinitionType {
        Source => "source",
        Destination => "destination",
        CustomFormat => "customformat",
    }
}

crate::stored_enum! {
    pub enum Status {
        Active => "active",
        Inactive => "inactive",
        Deprecated => "deprecated",
    }
}

crate::stored_enum! {
    pub enum ScheduleType {
        Manual => "manual",
        BasicSchedule => "basic_schedule",
        Cron => "cron",
    }
}

crate::stored_enum! {
    /// Data plane region a connection runs in
    pub enum Geography {
        Auto => "auto",
        Us => "us",
        Eu => "eu",
    }
}

crate::stored_enum! {
    /// What to do when a source schema changes without breaking the connection.
    /// Stored as the schema management auto-propagation status.
    pub enum NonBreakingChangesPreference {
        Ignore => "ignore",
        Disable => "disable",
        PropagateColumns => "propagate_columns",
        PropagateFully => "propagate_fully",
    }
}

crate::stored_enum! {
    pub enum NotificationType {
        Webhook => "webhook",
        Email => "email",
    }
}

crate::stored_enum! {
    pub enum TimeUnit {
        Minutes => "minutes",
        Hours => "hours",
        Days => "days",
        Weeks => "weeks",
        Months => "months",
    }
}

/// Legacy interval schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub time_unit: TimeUnit,
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSchedule {
    pub time_unit: TimeUnit,
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSchedule {
    pub cron_expression: String,
    pub cron_time_zone: String,
}

/// Schedule details matching the connection's [`ScheduleType`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_schedule: Option<BasicSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<CronSchedule>,
}

/// Container resource requests and limits, as Kubernetes quantity strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
}

/// Per-stream flag telling whether field selection is enabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSelectionData(pub BTreeMap<String, bool>);

/// A sync between one source and one destination (a "connection")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardSync {
    pub connection_id: Uuid,
    pub namespace_definition: NamespaceDefinitionType,
    pub namespace_format: Option<String>,
    pub prefix: Option<String>,
    pub source_id: Uuid,
    pub destination_id: Uuid,
    pub name: String,
    pub catalog: ConfiguredAirbyteCatalog,
    pub field_selection_data: Option<FieldSelectionData>,
    pub status: Option<Status>,
    pub schedule: Option<Schedule>,
    pub manual: bool,
    pub schedule_type: Option<ScheduleType>,
    pub schedule_data: Option<ScheduleData>,
    pub operation_ids: Vec<Uuid>,
    pub resource_requirements: Option<ResourceRequirements>,
    pub source_catalog_id: Option<Uuid>,
    pub breaking_change: bool,
    pub geography: Geography,
    pub non_breaking_changes_preference: NonBreakingChangesPreference,
    /// Some enabled webhook notification exists for the connection
    pub notify_schema_changes: bool,
    /// Some enabled email notification exists for the connection
    pub notify_schema_changes_by_email: bool,
}

/// Notification settings attached to a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfiguration {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub notification_type: NotificationType,
    pub enabled: bool,
}
