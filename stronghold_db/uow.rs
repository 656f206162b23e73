use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use stronghold_app::{
    repository::VillageRepository,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use stronghold_types::errors::{ApplicationError, DbError};

use crate::repository::PostgresVillageRepository;

/// Opens one PostgreSQL transaction per unit of work.
#[derive(Debug, Clone)]
pub struct PostgresUnitOfWorkProvider {
    pool: PgPool,
}

impl PostgresUnitOfWorkProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn open(&self, read_only: bool) -> Result<PostgresUnitOfWork<'_>, ApplicationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        if read_only {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        }

        Ok(PostgresUnitOfWork {
            tx: Arc::new(Mutex::new(tx)),
        })
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for PostgresUnitOfWorkProvider {
    async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        Ok(Box::new(self.open(false).await?))
    }

    async fn begin_read_only<'p>(
        &'p self,
    ) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        Ok(Box::new(self.open(true).await?))
    }
}

/// Every village repository handed out shares this transaction.
#[derive(Debug, Clone)]
pub struct PostgresUnitOfWork<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
}

impl<'a> PostgresUnitOfWork<'a> {
    /// Takes the transaction back from the repositories.
    fn into_transaction(self) -> Result<Transaction<'a, Postgres>, ApplicationError> {
        Arc::try_unwrap(self.tx)
            .map(Mutex::into_inner)
            .map_err(|_| {
                ApplicationError::Db(DbError::Transaction(
                    "a village repository still holds the transaction".to_string(),
                ))
            })
    }
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for PostgresUnitOfWork<'a> {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        Arc::new(PostgresVillageRepository::new(self.tx.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        self.into_transaction()?
            .commit()
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        // A transaction still shared with a repository rolls back when the last clone drops.
        let Ok(tx) = self.into_transaction() else {
            return Ok(());
        };
        tx.rollback()
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))
    }
}
