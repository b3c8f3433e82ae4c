use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};
use syncplane_core::models::{
    Organization, OrganizationPatch, Permission, ResourcesByUserQueryPaginated, SsoConfig,
};
use syncplane_core::AppError;
use uuid::Uuid;

use crate::db::constraint::map_write_error;
use crate::db::control::permission::insert_permission_query;
use crate::db::converter::{build_organization, build_sso_config};
use crate::db::rows::{OrganizationRow, SsoConfigRow};
use crate::db::transaction::TransactionGuard;

/// Organization columns joined with the realm of its SSO config, aliased `o` and `sc`.
const ORGANIZATION_COLUMNS: &str =
    "o.id, o.name, o.user_id, o.email, o.pba, o.org_level_billing, sc.keycloak_realm";

/// Organizations the user holds any organization-level grant on, optionally filtered by a
/// case-insensitive substring of the name. `EXISTS` keeps one row per organization whatever
/// the number of grants.
const ORGANIZATIONS_BY_USER_SQL: &str = r#"
    SELECT o.id, o.name, o.user_id, o.email, o.pba, o.org_level_billing, sc.keycloak_realm
    FROM organization o
    LEFT JOIN sso_config sc ON sc.organization_id = o.id
    WHERE EXISTS (
        SELECT 1 FROM permission p
        WHERE p.organization_id = o.id AND p.user_id = $1
    )
    AND ($2::text IS NULL OR strpos(lower(o.name), lower($2::text)) > 0)
    ORDER BY o.name ASC, o.id ASC
"#;

fn insert_organization_query(org: &Organization) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO organization (id, name, user_id, email, pba, org_level_billing)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(org.organization_id)
    .bind(&org.name)
    .bind(org.user_id)
    .bind(&org.email)
    .bind(org.pba)
    .bind(org.org_level_billing)
}

fn insert_sso_config_query(config: &SsoConfig) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO sso_config (id, organization_id, keycloak_realm)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(config.sso_config_id)
    .bind(config.organization_id)
    .bind(&config.keycloak_realm)
}

/// Repository for organizations and their SSO configuration
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new organization. `sso_realm` on the input is ignored.
    #[tracing::instrument(skip(self, org), fields(db.table = "organization", db.operation = "insert", db.record_id = %org.organization_id))]
    pub async fn create_organization(&self, org: &Organization) -> Result<(), AppError> {
        insert_organization_query(org)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "organization"))?;
        Ok(())
    }

    /// Insert a new organization within a transaction.
    #[tracing::instrument(skip(self, tx, org), fields(db.table = "organization", db.operation = "insert", db.record_id = %org.organization_id))]
    pub async fn create_organization_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        org: &Organization,
    ) -> Result<(), AppError> {
        insert_organization_query(org)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "organization"))?;
        Ok(())
    }

    /// Create an organization and its first grant atomically: both rows or neither.
    #[tracing::instrument(skip(self, org, grant), fields(db.table = "organization", db.operation = "insert", db.record_id = %org.organization_id))]
    pub async fn create_organization_with_grant(
        &self,
        org: &Organization,
        grant: &Permission,
    ) -> Result<(), AppError> {
        grant.validate()?;
        if grant.organization_id != Some(org.organization_id) {
            return Err(AppError::InvalidInput(format!(
                "Permission {} does not target organization {}",
                grant.permission_id, org.organization_id
            )));
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        match self.insert_organization_and_grant(&mut tx, org, grant).await {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        }

        tracing::info!(
            organization_id = %org.organization_id,
            user_id = %grant.user_id,
            "Organization created with initial grant"
        );
        Ok(())
    }

    async fn insert_organization_and_grant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        org: &Organization,
        grant: &Permission,
    ) -> Result<(), AppError> {
        self.create_organization_tx(tx, org).await?;
        insert_permission_query(grant)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "permission"))?;
        Ok(())
    }

    /// Get organization by ID, with the realm of its SSO config when one exists
    #[tracing::instrument(skip(self), fields(db.table = "organization", db.operation = "select", db.record_id = %id))]
    pub async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let row = sqlx::query_as::<Postgres, OrganizationRow>(&format!(
            "SELECT {} FROM organization o LEFT JOIN sso_config sc ON sc.organization_id = o.id WHERE o.id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(build_organization).transpose()
    }

    /// Sparse update: only fields present in the patch are written.
    #[tracing::instrument(skip(self, patch), fields(db.table = "organization", db.operation = "update", db.record_id = %patch.organization_id))]
    pub async fn update_organization(
        &self,
        patch: &OrganizationPatch,
    ) -> Result<Organization, AppError> {
        let not_found = || {
            AppError::OrganizationNotFound(format!(
                "Organization {} does not exist",
                patch.organization_id
            ))
        };

        if patch.is_empty() {
            return self
                .get_organization(patch.organization_id)
                .await?
                .ok_or_else(not_found);
        }

        // Build update query
        let mut query = String::from("UPDATE organization SET updated_at = NOW()");
        let mut bind_index = 1;

        if patch.name.is_some() {
            query.push_str(&format!(", name = ${}", bind_index));
            bind_index += 1;
        }
        if patch.user_id.is_some() {
            query.push_str(&format!(", user_id = ${}", bind_index));
            bind_index += 1;
        }
        if patch.email.is_some() {
            query.push_str(&format!(", email = ${}", bind_index));
            bind_index += 1;
        }
        if patch.pba.is_some() {
            query.push_str(&format!(", pba = ${}", bind_index));
            bind_index += 1;
        }
        if patch.org_level_billing.is_some() {
            query.push_str(&format!(", org_level_billing = ${}", bind_index));
            bind_index += 1;
        }

        let sql = format!(
            "WITH o AS ({} WHERE id = ${} RETURNING *) SELECT {} FROM o LEFT JOIN sso_config sc ON sc.organization_id = o.id",
            query, bind_index, ORGANIZATION_COLUMNS
        );

        let mut query_builder = sqlx::query_as::<Postgres, OrganizationRow>(&sql);
        if let Some(ref name) = patch.name {
            query_builder = query_builder.bind(name);
        }
        if let Some(user_id) = patch.user_id {
            query_builder = query_builder.bind(user_id);
        }
        if let Some(ref email) = patch.email {
            query_builder = query_builder.bind(email);
        }
        if let Some(pba) = patch.pba {
            query_builder = query_builder.bind(pba);
        }
        if let Some(org_level_billing) = patch.org_level_billing {
            query_builder = query_builder.bind(org_level_billing);
        }
        query_builder = query_builder.bind(patch.organization_id);

        let row = query_builder
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "organization"))?;

        match row {
            Some(row) => build_organization(row),
            None => Err(not_found()),
        }
    }

    /// Insert the SSO config of an organization. A second config for the same organization is
    /// a [`AppError::Conflict`].
    #[tracing::instrument(skip(self, config), fields(db.table = "sso_config", db.operation = "insert", db.record_id = %config.sso_config_id))]
    pub async fn create_sso_config(&self, config: &SsoConfig) -> Result<(), AppError> {
        insert_sso_config_query(config)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "sso config"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, tx, config), fields(db.table = "sso_config", db.operation = "insert", db.record_id = %config.sso_config_id))]
    pub async fn create_sso_config_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        config: &SsoConfig,
    ) -> Result<(), AppError> {
        insert_sso_config_query(config)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "sso config"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "sso_config", db.operation = "select"))]
    pub async fn get_sso_config_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<SsoConfig>, AppError> {
        let row = sqlx::query_as::<Postgres, SsoConfigRow>(
            "SELECT id, organization_id, keycloak_realm FROM sso_config WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(build_sso_config))
    }

    /// List every organization visible to the user, ordered by name then id
    #[tracing::instrument(skip(self), fields(db.table = "organization", db.operation = "select"))]
    pub async fn list_organizations_by_user_id(
        &self,
        user_id: Uuid,
        keyword: Option<&str>,
    ) -> Result<Vec<Organization>, AppError> {
        let rows = sqlx::query_as::<Postgres, OrganizationRow>(ORGANIZATIONS_BY_USER_SQL)
            .bind(user_id)
            .bind(keyword)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(build_organization).collect()
    }

    /// One page of [`Self::list_organizations_by_user_id`]. Invalid paging is rejected before
    /// the store is queried.
    #[tracing::instrument(skip(self), fields(db.table = "organization", db.operation = "select", page_size = query.page_size, row_offset = query.row_offset))]
    pub async fn list_organizations_by_user_id_paginated(
        &self,
        query: &ResourcesByUserQueryPaginated,
        keyword: Option<&str>,
    ) -> Result<Vec<Organization>, AppError> {
        query.validate()?;
        if query.include_deleted {
            tracing::debug!("include_deleted has no effect on organizations");
        }

        let rows = sqlx::query_as::<Postgres, OrganizationRow>(&format!(
            "{} LIMIT $3 OFFSET $4",
            ORGANIZATIONS_BY_USER_SQL
        ))
        .bind(query.user_id)
        .bind(keyword)
        .bind(i64::from(query.page_size))
        .bind(i64::from(query.row_offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(build_organization).collect()
    }
}
