use sqlx::{PgPool, Postgres};
use syncplane_core::models::{
    ActorDefinitionBreakingChange, ActorDefinitionConfigInjection, ActorDefinitionVersion,
    StandardDestinationDefinition, StandardSourceDefinition,
};
use syncplane_core::AppError;
use uuid::Uuid;

use crate::db::converter::{
    build_actor_definition_breaking_change, build_actor_definition_config_injection,
    build_actor_definition_version, build_standard_destination_definition,
    build_standard_source_definition, ConverterContext,
};
use crate::db::rows::{
    ActorDefinitionRow, ActorDefinitionVersionRow, BreakingChangeRow, ConfigInjectionRow,
};

const ACTOR_DEFINITION_COLUMNS: &str = "id, name, default_version_id, icon, actor_type, \
     source_type, tombstone, public, custom, resource_requirements, max_seconds_between_messages";

/// Repository for connector definitions and their versions
#[derive(Clone)]
pub struct ActorDefinitionRepository {
    pool: PgPool,
    ctx: ConverterContext,
}

impl ActorDefinitionRepository {
    pub fn new(pool: PgPool, ctx: ConverterContext) -> Self {
        Self { pool, ctx }
    }

    #[tracing::instrument(skip(self), fields(db.table = "actor_definition_version", db.operation = "select", db.record_id = %id))]
    pub async fn get_actor_definition_version(
        &self,
        id: Uuid,
    ) -> Result<Option<ActorDefinitionVersion>, AppError> {
        let row = sqlx::query_as::<Postgres, ActorDefinitionVersionRow>(
            r#"
            SELECT id, actor_definition_id, docker_repository, docker_image_tag, spec,
                   documentation_url, support_level, protocol_version, release_stage,
                   release_date, allowed_hosts, suggested_streams, supports_dbt,
                   normalization_repository, normalization_tag,
                   normalization_integration_type, support_state
            FROM actor_definition_version
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(build_actor_definition_version).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "actor_definition", db.operation = "select", db.record_id = %id))]
    pub async fn get_standard_source_definition(
        &self,
        id: Uuid,
    ) -> Result<Option<StandardSourceDefinition>, AppError> {
        let default_max = self.ctx.default_max_seconds_between_messages;
        self.fetch_definition(id, "source")
            .await?
            .map(|row| build_standard_source_definition(row, default_max))
            .transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "actor_definition", db.operation = "select", db.record_id = %id))]
    pub async fn get_standard_destination_definition(
        &self,
        id: Uuid,
    ) -> Result<Option<StandardDestinationDefinition>, AppError> {
        self.fetch_definition(id, "destination")
            .await?
            .map(build_standard_destination_definition)
            .transpose()
    }

    /// Breaking changes of a definition, oldest version first
    #[tracing::instrument(skip(self), fields(db.table = "actor_definition_breaking_change", db.operation = "select"))]
    pub async fn list_breaking_changes_for_definition(
        &self,
        actor_definition_id: Uuid,
    ) -> Result<Vec<ActorDefinitionBreakingChange>, AppError> {
        let rows = sqlx::query_as::<Postgres, BreakingChangeRow>(
            r#"
            SELECT actor_definition_id, version, message, upgrade_deadline,
                   migration_documentation_url
            FROM actor_definition_breaking_change
            WHERE actor_definition_id = $1
            "#,
        )
        .bind(actor_definition_id)
        .fetch_all(&self.pool)
        .await?;

        let mut changes = rows
            .into_iter()
            .map(build_actor_definition_breaking_change)
            .collect::<Result<Vec<_>, _>>()?;
        // Versions are text in the store, so order after parsing
        changes.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(changes)
    }

    #[tracing::instrument(skip(self), fields(db.table = "actor_definition_config_injection", db.operation = "select"))]
    pub async fn list_config_injections(
        &self,
        actor_definition_id: Uuid,
    ) -> Result<Vec<ActorDefinitionConfigInjection>, AppError> {
        let rows = sqlx::query_as::<Postgres, ConfigInjectionRow>(
            r#"
            SELECT actor_definition_id, injection_path, json_to_inject
            FROM actor_definition_config_injection
            WHERE actor_definition_id = $1
            ORDER BY injection_path
            "#,
        )
        .bind(actor_definition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(build_actor_definition_config_injection)
            .collect())
    }

    async fn fetch_definition(
        &self,
        id: Uuid,
        actor_type: &str,
    ) -> Result<Option<ActorDefinitionRow>, AppError> {
        let row = sqlx::query_as::<Postgres, ActorDefinitionRow>(&format!(
            "SELECT {} FROM actor_definition WHERE id = $1 AND actor_type = $2",
            ACTOR_DEFINITION_COLUMNS
        ))
        .bind(id)
        .bind(actor_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
