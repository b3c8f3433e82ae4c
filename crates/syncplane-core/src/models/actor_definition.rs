use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::models::ResourceRequirements;
use crate::version::Version;

crate::stored_enum! {
    pub enum SupportLevel {
        None => "none",
        Community => "community",
        Certified => "certified",
    }
}

crate::stored_enum! {
    /// Whether a connector version may still be used
    pub enum SupportState {
        Supported => "supported",
        Deprecated => "deprecated",
        Unsupported => "unsupported",
    }
}

crate::stored_enum! {
    pub enum ReleaseStage {
        Alpha => "alpha",
        Beta => "beta",
        GenerallyAvailable => "generally_available",
        Custom => "custom",
    }
}

crate::stored_enum! {
    pub enum SourceType {
        Api => "api",
        File => "file",
        Database => "database",
        Custom => "custom",
    }
}

crate::stored_enum! {
    pub enum JobType {
        GetSpec => "get_spec",
        CheckConnection => "check_connection",
        DiscoverSchema => "discover_schema",
        Sync => "sync",
        ResetConnection => "reset_connection",
        ConnectionUpdater => "connection_updater",
        Replicate => "replicate",
    }
}

/// Connector specification as returned by the connector's `spec` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    pub connection_specification: JsonValue,
    #[serde(flatten)]
    pub additional: Map<String, JsonValue>,
}

/// Network hosts a connector is allowed to reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedHosts {
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Streams suggested for selection when a connection is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedStreams {
    #[serde(default)]
    pub streams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationDestinationDefinitionConfig {
    pub normalization_repository: String,
    pub normalization_tag: String,
    pub normalization_integration_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTypeResourceLimit {
    pub job_type: JobType,
    pub resource_requirements: ResourceRequirements,
}

/// Resource defaults of a connector definition, optionally overridden per job type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDefinitionResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_specific: Vec<JobTypeResourceLimit>,
}

/// One released image of a connector definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDefinitionVersion {
    pub version_id: Uuid,
    pub actor_definition_id: Uuid,
    pub docker_repository: String,
    pub docker_image_tag: String,
    pub spec: ConnectorSpecification,
    pub documentation_url: Option<String>,
    pub support_level: Option<SupportLevel>,
    /// Always present; NULL in the store reads as protocol 0.2.0.
    pub protocol_version: Version,
    pub release_stage: Option<ReleaseStage>,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub allowed_hosts: Option<AllowedHosts>,
    pub suggested_streams: Option<SuggestedStreams>,
    pub supports_dbt: Option<bool>,
    pub normalization_config: Option<NormalizationDestinationDefinitionConfig>,
    pub support_state: SupportState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardSourceDefinition {
    pub source_definition_id: Uuid,
    pub default_version_id: Option<Uuid>,
    pub icon: Option<String>,
    pub name: String,
    pub source_type: Option<SourceType>,
    pub tombstone: bool,
    pub public: bool,
    pub custom: bool,
    pub resource_requirements: Option<ActorDefinitionResourceRequirements>,
    /// Heartbeat threshold; the configured default when the store has none.
    pub max_seconds_between_messages: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDestinationDefinition {
    pub destination_definition_id: Uuid,
    pub default_version_id: Option<Uuid>,
    pub icon: Option<String>,
    pub name: String,
    pub tombstone: bool,
    pub public: bool,
    pub custom: bool,
    pub resource_requirements: Option<ActorDefinitionResourceRequirements>,
}

/// Announced breaking change of a connector definition at a given version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDefinitionBreakingChange {
    pub actor_definition_id: Uuid,
    pub version: Version,
    pub message: String,
    /// `YYYY-MM-DD`
    pub upgrade_deadline: String,
    pub migration_documentation_url: String,
}

/// JSON merged into a connector's configuration at `injection_path`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDefinitionConfigInjection {
    pub actor_definition_id: Uuid,
    pub injection_path: String,
    pub json_to_inject: JsonValue,
}
