use std::collections::BTreeSet;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};
use syncplane_core::models::{OrganizationUserPermission, Permission};
use syncplane_core::{AppError, StoredEnum};
use uuid::Uuid;

use crate::db::constraint::map_write_error;
use crate::db::converter::{build_organization_user_permission, build_permission};
use crate::db::rows::{OrganizationUserPermissionRow, PermissionRow};

pub(crate) fn insert_permission_query(permission: &Permission) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO permission (id, user_id, workspace_id, organization_id, permission_type)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(permission.permission_id)
    .bind(permission.user_id)
    .bind(permission.workspace_id)
    .bind(permission.organization_id)
    .bind(permission.permission_type.as_token())
}

/// Repository for permission grants
#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a grant after checking its target and type.
    #[tracing::instrument(skip(self, permission), fields(db.table = "permission", db.operation = "insert", db.record_id = %permission.permission_id))]
    pub async fn write_permission(&self, permission: &Permission) -> Result<(), AppError> {
        permission.validate()?;
        insert_permission_query(permission)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "permission"))?;
        Ok(())
    }

    /// Insert a grant within a transaction.
    #[tracing::instrument(skip(self, tx, permission), fields(db.table = "permission", db.operation = "insert", db.record_id = %permission.permission_id))]
    pub async fn write_permission_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        permission: &Permission,
    ) -> Result<(), AppError> {
        permission.validate()?;
        insert_permission_query(permission)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "permission"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "permission", db.operation = "select"))]
    pub async fn get_permissions_for_user(&self, user_id: Uuid) -> Result<Vec<Permission>, AppError> {
        let rows = sqlx::query_as::<Postgres, PermissionRow>(
            r#"
            SELECT id, user_id, workspace_id, organization_id, permission_type
            FROM permission
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(build_permission).collect()
    }

    /// Organizations on which the user holds an organization-level grant of any type.
    /// Workspace grants alone do not make an organization visible.
    #[tracing::instrument(skip(self), fields(db.table = "permission", db.operation = "select"))]
    pub async fn list_organization_ids_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<BTreeSet<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            SELECT DISTINCT organization_id
            FROM permission
            WHERE user_id = $1 AND organization_id IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Members of an organization with their grant, ordered by user name then user id
    #[tracing::instrument(skip(self), fields(db.table = "permission", db.operation = "select"))]
    pub async fn list_users_in_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationUserPermission>, AppError> {
        let rows = sqlx::query_as::<Postgres, OrganizationUserPermissionRow>(
            r#"
            SELECT u.id AS user_id, u.name AS user_name, u.email, p.permission_type
            FROM permission p
            JOIN "user" u ON u.id = p.user_id
            WHERE p.organization_id = $1
            ORDER BY u.name ASC, u.id ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(build_organization_user_permission).collect()
    }
}
