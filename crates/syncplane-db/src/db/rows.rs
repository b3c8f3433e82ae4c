//! Row shapes returned by the repository queries
//!
//! Columns that the mappers treat as mandatory but that a hand-written or legacy row could
//! leave NULL are kept as `Option` here, so the decision (fault or default) stays in
//! [`crate::db::converter`].

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// `organization` joined with its optional `sso_config`.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub pba: bool,
    pub org_level_billing: bool,
    pub keycloak_realm: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SsoConfigRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub keycloak_realm: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub auth_user_id: String,
    pub auth_provider: Option<String>,
    pub email: String,
    pub default_workspace_id: Option<Uuid>,
    pub status: Option<String>,
    pub company_name: Option<String>,
    pub news: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PermissionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub permission_type: String,
}

/// `permission` joined with `user` for organization member listings.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationUserPermissionRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub permission_type: String,
}

/// `connection` joined with `schema_management.auto_propagation_status`.
#[derive(Debug, Clone, FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub namespace_definition: Option<String>,
    pub namespace_format: Option<String>,
    pub prefix: Option<String>,
    pub source_id: Uuid,
    pub destination_id: Uuid,
    pub name: Option<String>,
    pub catalog: Option<JsonValue>,
    pub status: Option<String>,
    pub schedule: Option<JsonValue>,
    pub manual: bool,
    pub schedule_type: Option<String>,
    pub schedule_data: Option<JsonValue>,
    pub resource_requirements: Option<JsonValue>,
    pub source_catalog_id: Option<Uuid>,
    pub breaking_change: bool,
    pub geography: Option<String>,
    pub field_selection_data: Option<JsonValue>,
    pub auto_propagation_status: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationConfigurationRow {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub notification_type: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActorDefinitionVersionRow {
    pub id: Uuid,
    pub actor_definition_id: Uuid,
    pub docker_repository: String,
    pub docker_image_tag: String,
    pub spec: JsonValue,
    pub documentation_url: Option<String>,
    pub support_level: Option<String>,
    pub protocol_version: Option<String>,
    pub release_stage: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub allowed_hosts: Option<JsonValue>,
    pub suggested_streams: Option<JsonValue>,
    pub supports_dbt: Option<bool>,
    pub normalization_repository: Option<String>,
    pub normalization_tag: Option<String>,
    pub normalization_integration_type: Option<String>,
    pub support_state: Option<String>,
}

/// `actor_definition`, shared by source and destination definitions.
#[derive(Debug, Clone, FromRow)]
pub struct ActorDefinitionRow {
    pub id: Uuid,
    pub name: String,
    pub default_version_id: Option<Uuid>,
    pub icon: Option<String>,
    pub actor_type: String,
    pub source_type: Option<String>,
    pub tombstone: bool,
    pub public: bool,
    pub custom: bool,
    pub resource_requirements: Option<JsonValue>,
    pub max_seconds_between_messages: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActorCatalogRow {
    pub id: Uuid,
    pub catalog: JsonValue,
    pub catalog_hash: String,
}

/// An actor catalog with the time of the fetch event that last produced it.
#[derive(Debug, Clone, FromRow)]
pub struct ActorCatalogWithFetchRow {
    #[sqlx(flatten)]
    pub catalog: ActorCatalogRow,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActorCatalogFetchEventRow {
    pub actor_id: Uuid,
    pub actor_catalog_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BreakingChangeRow {
    pub actor_definition_id: Uuid,
    pub version: String,
    pub message: String,
    pub upgrade_deadline: NaiveDate,
    pub migration_documentation_url: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ConfigInjectionRow {
    pub actor_definition_id: Uuid,
    pub injection_path: String,
    pub json_to_inject: JsonValue,
}
