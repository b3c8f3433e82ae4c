//! Caller-owned transactions
//!
//! Writes that must land together (an organization and its first grant) run on one
//! [`TransactionGuard`] through the repositories' `*_tx` methods. The guard derefs to the
//! underlying `sqlx` transaction, so `&mut guard` can be passed wherever a
//! `&mut Transaction<'_, Postgres>` is expected.

use sqlx::{PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};
use syncplane_core::AppError;

/// An open transaction that must be finished with [`TransactionGuard::commit`] or
/// [`TransactionGuard::rollback`]. Dropping it unfinished rolls back and logs a warning.
///
/// ```ignore
/// let mut tx = TransactionGuard::begin(&pool).await?;
/// organizations.create_organization_tx(&mut tx, &org).await?;
/// permissions.write_permission_tx(&mut tx, &grant).await?;
/// tx.commit().await?;
/// ```
pub struct TransactionGuard<'a> {
    inner: Option<Transaction<'a, Postgres>>,
    finished: bool,
}

impl<'a> TransactionGuard<'a> {
    #[tracing::instrument(skip(pool))]
    pub async fn begin(pool: &'a PgPool) -> Result<Self, AppError> {
        let inner = pool.begin().await?;
        tracing::trace!("transaction started");
        Ok(Self {
            inner: Some(inner),
            finished: false,
        })
    }

    pub async fn commit(mut self) -> Result<(), AppError> {
        self.finished = true;
        if let Some(inner) = self.inner.take() {
            inner.commit().await?;
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<(), AppError> {
        self.finished = true;
        if let Some(inner) = self.inner.take() {
            inner.rollback().await?;
        }
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}

// `inner` is only taken by `commit` and `rollback`, which consume the guard.
impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref().expect("transaction already finished")
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut().expect("transaction already finished")
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // sqlx rolls the inner transaction back when it is dropped
            tracing::warn!("transaction dropped without commit or rollback, rolling back");
        }
    }
}
