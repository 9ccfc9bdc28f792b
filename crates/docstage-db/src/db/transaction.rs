//! Transaction guard for multi-statement writes.

use anyhow::Context;
use docstage_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};

/// Owns an open transaction until it is committed or rolled back.
///
/// A guard dropped while still open rolls back when sqlx returns the connection
/// to the pool.
///
/// ```ignore
/// let mut tx = TransactionGuard::begin(&pool).await?;
/// sqlx::query("INSERT INTO ...").execute(&mut **tx).await?;
/// tx.commit().await?;
/// ```
pub struct TransactionGuard<'a> {
    transaction: Transaction<'a, Postgres>,
}

impl<'a> TransactionGuard<'a> {
    pub async fn begin(pool: &'a PgPool) -> Result<Self, AppError> {
        let transaction = pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;
        Ok(Self { transaction })
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.transaction
            .commit()
            .await
            .context("Failed to commit database transaction")?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.transaction
            .rollback()
            .await
            .context("Failed to rollback database transaction")?;
        Ok(())
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.transaction
    }
}
