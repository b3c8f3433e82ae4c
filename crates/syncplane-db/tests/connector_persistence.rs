#![cfg(feature = "integration")]

mod common;

use common::{insert_workspace, setup_test_db};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use syncplane_core::catalog::CatalogMigrationMode;
use syncplane_core::models::{
    Geography, NamespaceDefinitionType, NonBreakingChangesPreference, NotificationType,
    SupportState,
};
use syncplane_core::{AppError, ProtocolVersion, Version};
use syncplane_db::{
    ActorCatalogRepository, ActorDefinitionRepository, ConnectionRepository, ConverterContext,
};
use uuid::Uuid;

fn v1_catalog() -> JsonValue {
    json!({
        "streams": [{
            "name": "users",
            "json_schema": {
                "type": "object",
                "properties": {
                    "id": {"$ref": "WellKnownTypes.json#/definitions/Integer"},
                    "created": {"$ref": "WellKnownTypes.json#/definitions/TimestampWithTimezone"}
                }
            },
            "supported_sync_modes": ["full_refresh"]
        }]
    })
}

fn v1_configured_catalog() -> JsonValue {
    json!({
        "streams": [{
            "stream": v1_catalog()["streams"][0].clone(),
            "sync_mode": "full_refresh",
            "destination_sync_mode": "overwrite"
        }]
    })
}

async fn insert_definition(
    pool: &PgPool,
    actor_type: &str,
    max_seconds_between_messages: Option<i64>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO actor_definition (id, name, actor_type, source_type, max_seconds_between_messages)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(format!("{} definition", actor_type))
    .bind(actor_type)
    .bind(if actor_type == "source" { Some("database") } else { None })
    .bind(max_seconds_between_messages)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn insert_actor(pool: &PgPool, workspace_id: Uuid, definition_id: Uuid, actor_type: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO actor (id, workspace_id, actor_definition_id, name, actor_type) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(workspace_id)
    .bind(definition_id)
    .bind(actor_type)
    .bind(actor_type)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn insert_catalog(pool: &PgPool, catalog: JsonValue, hash: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO actor_catalog (id, catalog, catalog_hash) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(catalog)
        .bind(hash)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn insert_fetch_event(pool: &PgPool, catalog_id: Uuid, actor_id: Uuid, hours_ago: i32) {
    sqlx::query(
        r#"
        INSERT INTO actor_catalog_fetch_event (id, actor_catalog_id, actor_id, created_at)
        VALUES ($1, $2, $3, NOW() - make_interval(hours => $4))
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(catalog_id)
    .bind(actor_id)
    .bind(hours_ago)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_fetch_event_at(
    pool: &PgPool,
    event_id: Uuid,
    catalog_id: Uuid,
    actor_id: Uuid,
    created_at: &str,
) {
    sqlx::query(
        r#"
        INSERT INTO actor_catalog_fetch_event (id, actor_catalog_id, actor_id, created_at)
        VALUES ($1, $2, $3, $4::timestamptz)
        "#,
    )
    .bind(event_id)
    .bind(catalog_id)
    .bind(actor_id)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
}

struct ConnectionFixture {
    connection_id: Uuid,
    source_id: Uuid,
    destination_id: Uuid,
}

async fn insert_connection(pool: &PgPool) -> ConnectionFixture {
    let workspace_id = insert_workspace(pool, None).await;
    let source_definition = insert_definition(pool, "source", None).await;
    let destination_definition = insert_definition(pool, "destination", None).await;
    let source_id = insert_actor(pool, workspace_id, source_definition, "source").await;
    let destination_id = insert_actor(pool, workspace_id, destination_definition, "destination").await;

    let connection_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO connection (id, namespace_definition, source_id, destination_id, name, catalog,
                                status, manual, schedule_type, schedule_data, geography,
                                field_selection_data)
        VALUES ($1, 'destination', $2, $3, 'users sync', $4, 'active', FALSE, 'cron', $5, 'eu', $6)
        "#,
    )
    .bind(connection_id)
    .bind(source_id)
    .bind(destination_id)
    .bind(v1_configured_catalog())
    .bind(json!({"cron": {"cronExpression": "0 0 * * * ?", "cronTimeZone": "UTC"}}))
    .bind(json!({"users": true}))
    .execute(pool)
    .await
    .unwrap();

    ConnectionFixture {
        connection_id,
        source_id,
        destination_id,
    }
}

async fn insert_notification(pool: &PgPool, connection_id: Uuid, kind: &str, enabled: bool) {
    sqlx::query(
        "INSERT INTO notification_configuration (id, connection_id, notification_type, enabled) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(connection_id)
    .bind(kind)
    .bind(enabled)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_standard_sync_with_dependent_rows() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;
    let operation_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO connection_operation (id, connection_id, operation_id) VALUES ($1, $2, $3)",
    )
    .bind(Uuid::new_v4())
    .bind(fixture.connection_id)
    .bind(operation_id)
    .execute(&db.pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO schema_management (id, connection_id, auto_propagation_status) VALUES ($1, $2, 'propagate_fully')",
    )
    .bind(Uuid::new_v4())
    .bind(fixture.connection_id)
    .execute(&db.pool)
    .await
    .unwrap();
    insert_notification(&db.pool, fixture.connection_id, "webhook", true).await;
    insert_notification(&db.pool, fixture.connection_id, "email", false).await;

    let repo = ConnectionRepository::new(db.pool.clone(), ConverterContext::default());
    let sync = repo
        .get_standard_sync(fixture.connection_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(sync.name, "users sync");
    assert_eq!(sync.source_id, fixture.source_id);
    assert_eq!(sync.destination_id, fixture.destination_id);
    assert_eq!(sync.namespace_definition, NamespaceDefinitionType::Destination);
    assert_eq!(sync.geography, Geography::Eu);
    assert_eq!(sync.operation_ids, vec![operation_id]);
    assert_eq!(
        sync.non_breaking_changes_preference,
        NonBreakingChangesPreference::PropagateFully
    );
    assert!(sync.notify_schema_changes);
    assert!(!sync.notify_schema_changes_by_email);
    assert_eq!(
        sync.field_selection_data.as_ref().and_then(|f| f.0.get("users").copied()),
        Some(true)
    );

    // Stored as v1, read back downgraded
    let schema = &sync.catalog.streams[0].stream.json_schema;
    assert_eq!(
        schema["properties"]["id"],
        json!({"type": "number", "airbyte_type": "integer"})
    );

    let notifications = repo
        .list_notification_configurations(fixture.connection_id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .any(|n| n.notification_type == NotificationType::Email && !n.enabled));
}

#[tokio::test]
async fn test_standard_sync_defaults_without_dependent_rows() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;

    let repo = ConnectionRepository::new(db.pool.clone(), ConverterContext::default());
    let sync = repo
        .get_standard_sync(fixture.connection_id)
        .await
        .unwrap()
        .unwrap();

    assert!(sync.operation_ids.is_empty());
    assert!(!sync.notify_schema_changes);
    assert!(!sync.notify_schema_changes_by_email);
    assert_eq!(
        sync.non_breaking_changes_preference,
        NonBreakingChangesPreference::Ignore
    );
    assert!(repo.get_standard_sync(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_notification_type_fails_the_read() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;
    insert_notification(&db.pool, fixture.connection_id, "carrier_pigeon", true).await;

    let repo = ConnectionRepository::new(db.pool.clone(), ConverterContext::default());
    let err = repo
        .get_standard_sync(fixture.connection_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EnumDecode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_disabled_migration_keeps_stored_catalog() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;

    let ctx = ConverterContext {
        catalog_migration: CatalogMigrationMode::Disabled,
        ..ConverterContext::default()
    };
    let sync = ConnectionRepository::new(db.pool.clone(), ctx)
        .get_standard_sync(fixture.connection_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        sync.catalog.streams[0].stream.json_schema["properties"]["id"],
        json!({"$ref": "WellKnownTypes.json#/definitions/Integer"})
    );
}

#[tokio::test]
async fn test_source_definition_default_max_seconds() {
    let db = setup_test_db().await;
    let without = insert_definition(&db.pool, "source", None).await;
    let with_zero = insert_definition(&db.pool, "source", Some(0)).await;
    let destination = insert_definition(&db.pool, "destination", None).await;

    let ctx = ConverterContext {
        default_max_seconds_between_messages: 3600,
        ..ConverterContext::default()
    };
    let repo = ActorDefinitionRepository::new(db.pool.clone(), ctx);

    let source = repo.get_standard_source_definition(without).await.unwrap().unwrap();
    assert_eq!(source.max_seconds_between_messages, 3600);
    let source = repo.get_standard_source_definition(with_zero).await.unwrap().unwrap();
    assert_eq!(source.max_seconds_between_messages, 0);

    // Type mismatch reads as absent
    assert!(repo.get_standard_source_definition(destination).await.unwrap().is_none());
    let dest = repo
        .get_standard_destination_definition(destination)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dest.name, "destination definition");
}

#[tokio::test]
async fn test_actor_definition_version_mapping() {
    let db = setup_test_db().await;
    let definition_id = insert_definition(&db.pool, "destination", None).await;
    let version_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO actor_definition_version (id, actor_definition_id, docker_repository,
            docker_image_tag, spec, support_level, release_stage, release_date,
            normalization_repository, normalization_tag, support_state)
        VALUES ($1, $2, 'airbyte/destination-pg', '1.2.3', $3, 'certified', 'generally_available',
            '2023-04-05', 'airbyte/normalization', '0.4.0', 'supported')
        "#,
    )
    .bind(version_id)
    .bind(definition_id)
    .bind(json!({"connectionSpecification": {"type": "object"}}))
    .execute(&db.pool)
    .await
    .unwrap();

    let repo = ActorDefinitionRepository::new(db.pool.clone(), ConverterContext::default());
    let version = repo
        .get_actor_definition_version(version_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(version.docker_image_tag, "1.2.3");
    assert_eq!(version.protocol_version, ProtocolVersion::DEFAULT);
    assert_eq!(version.release_date.as_deref(), Some("2023-04-05"));
    assert_eq!(version.support_state, SupportState::Supported);
    // Integration type is missing, so no normalization config
    assert!(version.normalization_config.is_none());
}

#[tokio::test]
async fn test_version_without_support_state_fails() {
    let db = setup_test_db().await;
    let definition_id = insert_definition(&db.pool, "source", None).await;
    let version_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO actor_definition_version (id, actor_definition_id, docker_repository,
            docker_image_tag, spec)
        VALUES ($1, $2, 'airbyte/source-pg', '0.1.0', $3)
        "#,
    )
    .bind(version_id)
    .bind(definition_id)
    .bind(json!({"connectionSpecification": {}}))
    .execute(&db.pool)
    .await
    .unwrap();

    let repo = ActorDefinitionRepository::new(db.pool.clone(), ConverterContext::default());
    let err = repo.get_actor_definition_version(version_id).await.unwrap_err();
    assert!(matches!(err, AppError::MissingField(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_breaking_changes_and_config_injections() {
    let db = setup_test_db().await;
    let definition_id = insert_definition(&db.pool, "source", None).await;
    for (version, deadline) in [("2.0.0", "2024-02-01"), ("10.0.0", "2025-01-01"), ("1.0.0", "2023-06-15")] {
        sqlx::query(
            r#"
            INSERT INTO actor_definition_breaking_change (actor_definition_id, version, message,
                upgrade_deadline, migration_documentation_url)
            VALUES ($1, $2, 'breaking', $3::date, 'https://docs.example.com/migrate')
            "#,
        )
        .bind(definition_id)
        .bind(version)
        .bind(deadline)
        .execute(&db.pool)
        .await
        .unwrap();
    }
    sqlx::query(
        r#"
        INSERT INTO actor_definition_config_injection (actor_definition_id, injection_path, json_to_inject)
        VALUES ($1, 'manifest', $2)
        "#,
    )
    .bind(definition_id)
    .bind(json!({"version": "0.1"}))
    .execute(&db.pool)
    .await
    .unwrap();

    let repo = ActorDefinitionRepository::new(db.pool.clone(), ConverterContext::default());
    let changes = repo
        .list_breaking_changes_for_definition(definition_id)
        .await
        .unwrap();
    let versions: Vec<Version> = changes.iter().map(|c| c.version).collect();
    assert_eq!(
        versions,
        vec![Version::new(1, 0, 0), Version::new(2, 0, 0), Version::new(10, 0, 0)]
    );
    assert_eq!(changes[0].upgrade_deadline, "2023-06-15");

    let injections = repo.list_config_injections(definition_id).await.unwrap();
    assert_eq!(injections.len(), 1);
    assert_eq!(injections[0].injection_path, "manifest");
    assert_eq!(injections[0].json_to_inject, json!({"version": "0.1"}));
}

#[tokio::test]
async fn test_most_recent_catalog_for_source() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;
    let old_catalog = insert_catalog(&db.pool, json!({"streams": []}), "old").await;
    let new_catalog = insert_catalog(&db.pool, v1_catalog(), "new").await;
    insert_fetch_event(&db.pool, old_catalog, fixture.source_id, 48).await;
    insert_fetch_event(&db.pool, new_catalog, fixture.source_id, 1).await;

    let repo = ActorCatalogRepository::new(db.pool.clone(), ConverterContext::default());
    let latest = repo
        .get_most_recent_actor_catalog_for_source(fixture.source_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, new_catalog);
    assert_eq!(latest.catalog_hash, "new");
    assert!(latest.updated_at > 0);

    let events = repo.list_fetch_events_for_actor(fixture.source_id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].actor_catalog_id, new_catalog);
    assert!(events[0].created_at > events[1].created_at);

    assert!(repo
        .get_most_recent_actor_catalog_for_source(fixture.destination_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_get_actor_catalog_downgrades_schema() {
    let db = setup_test_db().await;
    let catalog_id = insert_catalog(&db.pool, v1_catalog(), "hash").await;

    let repo = ActorCatalogRepository::new(db.pool.clone(), ConverterContext::default());
    let catalog = repo.get_actor_catalog(catalog_id).await.unwrap().unwrap();
    assert_eq!(
        catalog.catalog.streams[0].json_schema["properties"]["id"],
        json!({"type": "number", "airbyte_type": "integer"})
    );

    let malformed = insert_catalog(&db.pool, json!({"streams": "nope"}), "bad").await;
    let err = repo.get_actor_catalog(malformed).await.unwrap_err();
    assert!(matches!(err, AppError::CatalogValidation(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_most_recent_catalog_breaks_timestamp_ties_by_event_id() {
    let db = setup_test_db().await;
    let fixture = insert_connection(&db.pool).await;
    let first_catalog = insert_catalog(&db.pool, json!({"streams": []}), "first").await;
    let second_catalog = insert_catalog(&db.pool, v1_catalog(), "second").await;
    let fetched_at = "2024-06-01 12:00:00+00";

    // Higher event id inserted first so insertion order cannot decide the result
    insert_fetch_event_at(&db.pool, Uuid::from_u128(2), second_catalog, fixture.source_id, fetched_at).await;
    insert_fetch_event_at(&db.pool, Uuid::from_u128(1), first_catalog, fixture.source_id, fetched_at).await;

    let repo = ActorCatalogRepository::new(db.pool.clone(), ConverterContext::default());
    for _ in 0..3 {
        let latest = repo
            .get_most_recent_actor_catalog_for_source(fixture.source_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second_catalog);
        assert_eq!(latest.catalog_hash, "second");
    }

    let events = repo.list_fetch_events_for_actor(fixture.source_id).await.unwrap();
    let catalog_ids: Vec<Uuid> = events.iter().map(|e| e.actor_catalog_id).collect();
    assert_eq!(catalog_ids, vec![second_catalog, first_catalog]);
}
