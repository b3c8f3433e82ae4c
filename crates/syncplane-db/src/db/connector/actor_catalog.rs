use sqlx::{PgPool, Postgres};
use syncplane_core::models::{ActorCatalog, ActorCatalogFetchEvent, ActorCatalogWithUpdatedAt};
use syncplane_core::AppError;
use uuid::Uuid;

use crate::db::converter::{
    build_actor_catalog, build_actor_catalog_fetch_event, build_actor_catalog_with_updated_at,
    ConverterContext,
};
use crate::db::rows::{ActorCatalogFetchEventRow, ActorCatalogRow, ActorCatalogWithFetchRow};

/// Repository for discovered catalogs and the fetch events that produced them
#[derive(Clone)]
pub struct ActorCatalogRepository {
    pool: PgPool,
    ctx: ConverterContext,
}

impl ActorCatalogRepository {
    pub fn new(pool: PgPool, ctx: ConverterContext) -> Self {
        Self { pool, ctx }
    }

    #[tracing::instrument(skip(self), fields(db.table = "actor_catalog", db.operation = "select", db.record_id = %id))]
    pub async fn get_actor_catalog(&self, id: Uuid) -> Result<Option<ActorCatalog>, AppError> {
        let row = sqlx::query_as::<Postgres, ActorCatalogRow>(
            "SELECT id, catalog, catalog_hash FROM actor_catalog WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| build_actor_catalog(row, &self.ctx)).transpose()
    }

    /// The catalog of the latest fetch event for the source, with that event's time.
    /// Events sharing a timestamp are ordered by event id.
    #[tracing::instrument(skip(self), fields(db.table = "actor_catalog", db.operation = "select"))]
    pub async fn get_most_recent_actor_catalog_for_source(
        &self,
        source_id: Uuid,
    ) -> Result<Option<ActorCatalogWithUpdatedAt>, AppError> {
        let row = sqlx::query_as::<Postgres, ActorCatalogWithFetchRow>(
            r#"
            SELECT ac.id, ac.catalog, ac.catalog_hash, fe.created_at AS fetched_at
            FROM actor_catalog ac
            JOIN actor_catalog_fetch_event fe ON fe.actor_catalog_id = ac.id
            WHERE fe.actor_id = $1
            ORDER BY fe.created_at DESC, fe.id DESC
            LIMIT 1
            "#,
        )
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| build_actor_catalog_with_updated_at(row, &self.ctx))
            .transpose()
    }

    /// Fetch events of an actor, newest first
    #[tracing::instrument(skip(self), fields(db.table = "actor_catalog_fetch_event", db.operation = "select"))]
    pub async fn list_fetch_events_for_actor(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<ActorCatalogFetchEvent>, AppError> {
        let rows = sqlx::query_as::<Postgres, ActorCatalogFetchEventRow>(
            r#"
            SELECT actor_id, actor_catalog_id, created_at
            FROM actor_catalog_fetch_event
            WHERE actor_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(build_actor_catalog_fetch_event).collect())
    }
}
