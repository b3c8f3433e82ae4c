use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};
use syncplane_core::models::User;
use syncplane_core::{AppError, StoredEnum};
use uuid::Uuid;

use crate::db::constraint::map_write_error;
use crate::db::converter::build_user;
use crate::db::rows::UserRow;

fn upsert_user_query(user: &User) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO "user" (id, name, auth_user_id, auth_provider, email, default_workspace_id,
                            status, company_name, news)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            auth_user_id = EXCLUDED.auth_user_id,
            auth_provider = EXCLUDED.auth_provider,
            email = EXCLUDED.email,
            default_workspace_id = EXCLUDED.default_workspace_id,
            status = EXCLUDED.status,
            company_name = EXCLUDED.company_name,
            news = EXCLUDED.news,
            updated_at = NOW()
        "#,
    )
    .bind(user.user_id)
    .bind(&user.name)
    .bind(&user.auth_user_id)
    .bind(user.auth_provider.as_token())
    .bind(&user.email)
    .bind(user.default_workspace_id)
    .bind(user.status.map(|s| s.as_token()))
    .bind(&user.company_name)
    .bind(user.news)
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user, or overwrite every column of an existing user with the same id.
    #[tracing::instrument(skip(self, user), fields(db.table = "user", db.operation = "upsert", db.record_id = %user.user_id))]
    pub async fn write_user(&self, user: &User) -> Result<(), AppError> {
        upsert_user_query(user)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "user"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, tx, user), fields(db.table = "user", db.operation = "upsert", db.record_id = %user.user_id))]
    pub async fn write_user_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
    ) -> Result<(), AppError> {
        upsert_user_query(user)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "user"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "user", db.operation = "select", db.record_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            r#"
            SELECT id, name, auth_user_id, auth_provider, email, default_workspace_id,
                   status, company_name, news
            FROM "user"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(build_user).transpose()
    }
}
