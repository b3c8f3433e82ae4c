use syncplane_core::models::{
    ActorCatalog, ActorCatalogFetchEvent, ActorCatalogWithUpdatedAt,
    ActorDefinitionBreakingChange, ActorDefinitionConfigInjection, ActorDefinitionVersion,
    NormalizationDestinationDefinitionConfig, ReleaseStage, SourceType, StandardDestinationDefinition,
    StandardSourceDefinition, SupportLevel, SupportState,
};
use syncplane_core::{AppError, ProtocolVersion, StoredEnum, Version};

use super::{decode_json, decode_json_optional, parse_discovered_catalog, required, ConverterContext};
use crate::db::rows::{
    ActorCatalogFetchEventRow, ActorCatalogRow, ActorCatalogWithFetchRow, ActorDefinitionRow,
    ActorDefinitionVersionRow, BreakingChangeRow, ConfigInjectionRow,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn build_actor_definition_version(
    row: ActorDefinitionVersionRow,
) -> Result<ActorDefinitionVersion, AppError> {
    let support_state = SupportState::decode(required(
        row.support_state.as_deref(),
        "actor_definition_version.support_state",
    )?)?;

    // Only a complete triple makes a normalization config
    let normalization_config = match (
        row.normalization_repository,
        row.normalization_tag,
        row.normalization_integration_type,
    ) {
        (Some(normalization_repository), Some(normalization_tag), Some(normalization_integration_type)) => {
            Some(NormalizationDestinationDefinitionConfig {
                normalization_repository,
                normalization_tag,
                normalization_integration_type,
            })
        }
        _ => None,
    };

    Ok(ActorDefinitionVersion {
        version_id: row.id,
        actor_definition_id: row.actor_definition_id,
        docker_repository: row.docker_repository,
        docker_image_tag: row.docker_image_tag,
        spec: decode_json(row.spec, "actor_definition_version.spec")?,
        documentation_url: row.documentation_url,
        support_level: SupportLevel::decode_optional(row.support_level.as_deref())?,
        protocol_version: ProtocolVersion::get_with_default(row.protocol_version.as_deref())?,
        release_stage: ReleaseStage::decode_optional(row.release_stage.as_deref())?,
        release_date: row.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
        allowed_hosts: decode_json_optional(
            row.allowed_hosts,
            "actor_definition_version.allowed_hosts",
        )?,
        suggested_streams: decode_json_optional(
            row.suggested_streams,
            "actor_definition_version.suggested_streams",
        )?,
        supports_dbt: row.supports_dbt,
        normalization_config,
        support_state,
    })
}

/// A NULL `max_seconds_between_messages` takes `default_max_seconds_between_messages`; a stored
/// zero is kept.
pub fn build_standard_source_definition(
    row: ActorDefinitionRow,
    default_max_seconds_between_messages: i64,
) -> Result<StandardSourceDefinition, AppError> {
    Ok(StandardSourceDefinition {
        source_definition_id: row.id,
        default_version_id: row.default_version_id,
        icon: row.icon,
        name: row.name,
        source_type: SourceType::decode_optional(row.source_type.as_deref())?,
        tombstone: row.tombstone,
        public: row.public,
        custom: row.custom,
        resource_requirements: decode_json_optional(
            row.resource_requirements,
            "actor_definition.resource_requirements",
        )?,
        max_seconds_between_messages: row
            .max_seconds_between_messages
            .unwrap_or(default_max_seconds_between_messages),
    })
}

pub fn build_standard_destination_definition(
    row: ActorDefinitionRow,
) -> Result<StandardDestinationDefinition, AppError> {
    Ok(StandardDestinationDefinition {
        destination_definition_id: row.id,
        default_version_id: row.default_version_id,
        icon: row.icon,
        name: row.name,
        tombstone: row.tombstone,
        public: row.public,
        custom: row.custom,
        resource_requirements: decode_json_optional(
            row.resource_requirements,
            "actor_definition.resource_requirements",
        )?,
    })
}

pub fn build_actor_catalog(
    row: ActorCatalogRow,
    ctx: &ConverterContext,
) -> Result<ActorCatalog, AppError> {
    Ok(ActorCatalog {
        id: row.id,
        catalog: parse_discovered_catalog(row.catalog, ctx)?,
        catalog_hash: row.catalog_hash,
    })
}

pub fn build_actor_catalog_with_updated_at(
    row: ActorCatalogWithFetchRow,
    ctx: &ConverterContext,
) -> Result<ActorCatalogWithUpdatedAt, AppError> {
    let catalog = build_actor_catalog(row.catalog, ctx)?;
    Ok(ActorCatalogWithUpdatedAt {
        id: catalog.id,
        catalog: catalog.catalog,
        catalog_hash: catalog.catalog_hash,
        updated_at: row.fetched_at.timestamp(),
    })
}

pub fn build_actor_catalog_fetch_event(row: ActorCatalogFetchEventRow) -> ActorCatalogFetchEvent {
    ActorCatalogFetchEvent {
        actor_id: row.actor_id,
        actor_catalog_id: row.actor_catalog_id,
        created_at: row.created_at.timestamp(),
    }
}

pub fn build_actor_definition_breaking_change(
    row: BreakingChangeRow,
) -> Result<ActorDefinitionBreakingChange, AppError> {
    let version: Version = row.version.parse().map_err(|e| {
        tracing::warn!(
            actor_definition_id = %row.actor_definition_id,
            version = %row.version,
            "stored breaking change version is malformed"
        );
        e
    })?;
    Ok(ActorDefinitionBreakingChange {
        actor_definition_id: row.actor_definition_id,
        version,
        message: row.message,
        upgrade_deadline: row.upgrade_deadline.format(DATE_FORMAT).to_string(),
        migration_documentation_url: row.migration_documentation_url,
    })
}

pub fn build_actor_definition_config_injection(
    row: ConfigInjectionRow,
) -> ActorDefinitionConfigInjection {
    ActorDefinitionConfigInjection {
        actor_definition_id: row.actor_definition_id,
        injection_path: row.injection_path,
        json_to_inject: row.json_to_inject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn version_row() -> ActorDefinitionVersionRow {
        ActorDefinitionVersionRow {
            id: Uuid::new_v4(),
            actor_definition_id: Uuid::new_v4(),
            docker_repository: "syncplane/source-postgres".to_string(),
            docker_image_tag: "3.2.1".to_string(),
            spec: json!({"connectionSpecification": {"type": "object"}}),
            documentation_url: None,
            support_level: Some("certified".to_string()),
            protocol_version: None,
            release_stage: Some("generally_available".to_string()),
            release_date: NaiveDate::from_ymd_opt(2023, 11, 2),
            allowed_hosts: Some(json!({"hosts": ["${host}"]})),
            suggested_streams: None,
            supports_dbt: None,
            normalization_repository: None,
            normalization_tag: None,
            normalization_integration_type: None,
            support_state: Some("supported".to_string()),
        }
    }

    fn definition_row(max_seconds: Option<i64>) -> ActorDefinitionRow {
        ActorDefinitionRow {
            id: Uuid::new_v4(),
            name: "Postgres".to_string(),
            default_version_id: None,
            icon: None,
            actor_type: "source".to_string(),
            source_type: Some("database".to_string()),
            tombstone: false,
            public: true,
            custom: false,
            resource_requirements: None,
            max_seconds_between_messages: max_seconds,
        }
    }

    #[test]
    fn test_protocol_version_defaults_when_null() {
        let version = build_actor_definition_version(version_row()).unwrap();
        assert_eq!(version.protocol_version.to_string(), "0.2.0");
        assert_eq!(version.support_level, Some(SupportLevel::Certified));
        assert_eq!(version.release_stage, Some(ReleaseStage::GenerallyAvailable));
        assert_eq!(version.release_date.as_deref(), Some("2023-11-02"));
        assert_eq!(version.allowed_hosts.unwrap().hosts, vec!["${host}".to_string()]);

        let mut row = version_row();
        row.protocol_version = Some("1.0.0".to_string());
        let version = build_actor_definition_version(row).unwrap();
        assert_eq!(version.protocol_version, ProtocolVersion::V1);
    }

    #[test]
    fn test_support_state_is_mandatory() {
        let mut row = version_row();
        row.support_state = None;
        assert!(matches!(
            build_actor_definition_version(row),
            Err(AppError::MissingField(_))
        ));

        let mut row = version_row();
        row.support_state = Some("retired".to_string());
        assert!(matches!(
            build_actor_definition_version(row),
            Err(AppError::EnumDecode(_))
        ));
    }

    #[test]
    fn test_normalization_config_needs_all_three_columns() {
        let mut row = version_row();
        row.normalization_repository = Some("syncplane/normalization".to_string());
        row.normalization_tag = Some("0.4.0".to_string());
        assert!(build_actor_definition_version(row.clone())
            .unwrap()
            .normalization_config
            .is_none());

        row.normalization_integration_type = Some("postgres".to_string());
        let config = build_actor_definition_version(row)
            .unwrap()
            .normalization_config
            .unwrap();
        assert_eq!(config.normalization_tag, "0.4.0");
    }

    #[test]
    fn test_malformed_allowed_hosts_faults() {
        let mut row = version_row();
        row.allowed_hosts = Some(json!({"hosts": "everything"}));
        assert!(matches!(
            build_actor_definition_version(row),
            Err(AppError::Decode { .. })
        ));
    }

    #[test]
    fn test_max_seconds_default_only_for_null() {
        let def = build_standard_source_definition(definition_row(None), 10800).unwrap();
        assert_eq!(def.max_seconds_between_messages, 10800);
        assert_eq!(def.source_type, Some(SourceType::Database));

        let def = build_standard_source_definition(definition_row(Some(0)), 10800).unwrap();
        assert_eq!(def.max_seconds_between_messages, 0);

        let def = build_standard_source_definition(definition_row(Some(60)), 10800).unwrap();
        assert_eq!(def.max_seconds_between_messages, 60);
    }

    #[test]
    fn test_destination_definition() {
        let mut row = definition_row(None);
        row.actor_type = "destination".to_string();
        row.resource_requirements = Some(json!({"default": {"memory_limit": "1Gi"}}));
        let def = build_standard_destination_definition(row).unwrap();
        assert_eq!(
            def.resource_requirements.unwrap().default.unwrap().memory_limit.as_deref(),
            Some("1Gi")
        );
    }

    #[test]
    fn test_fetch_event_epoch_seconds() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = build_actor_catalog_fetch_event(ActorCatalogFetchEventRow {
            actor_id: Uuid::new_v4(),
            actor_catalog_id: Uuid::new_v4(),
            created_at,
        });
        assert_eq!(event.created_at, 1_704_067_200);
    }

    #[test]
    fn test_catalog_with_updated_at() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let row = ActorCatalogWithFetchRow {
            catalog: ActorCatalogRow {
                id: Uuid::new_v4(),
                catalog: json!({"streams": [{"name": "users", "json_schema": {"type": "object"}}]}),
                catalog_hash: "abc".to_string(),
            },
            fetched_at,
        };
        let catalog = build_actor_catalog_with_updated_at(row, &ConverterContext::default()).unwrap();
        assert_eq!(catalog.updated_at, 1_704_067_260);
        assert_eq!(catalog.catalog.streams[0].name, "users");
    }

    #[test]
    fn test_breaking_change() {
        let row = BreakingChangeRow {
            actor_definition_id: Uuid::new_v4(),
            version: "2.0.0".to_string(),
            message: "Cursor column renamed".to_string(),
            upgrade_deadline: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            migration_documentation_url: "https://docs.example.test/migrate".to_string(),
        };
        let change = build_actor_definition_breaking_change(row.clone()).unwrap();
        assert_eq!(change.version, Version::new(2, 0, 0));
        assert_eq!(change.upgrade_deadline, "2024-03-01");

        let bad = BreakingChangeRow {
            version: "two".to_string(),
            ..row
        };
        assert!(matches!(
            build_actor_definition_breaking_change(bad),
            Err(AppError::InvalidVersion(_))
        ));
    }
}
