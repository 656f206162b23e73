use std::sync::Arc;

use stronghold_types::errors::ApplicationError;

use crate::repository::VillageRepository;

/// A Unit of Work (UoW) works as a provider for repositories
/// that all operate within a single transaction.
#[async_trait::async_trait]
pub trait UnitOfWork<'a>: Send + Sync {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a>;

    // Consume self to ensure the UoW is not used after commit/rollback
    async fn commit(self: Box<Self>) -> Result<(), ApplicationError>;
    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError>;
}

/// A factory for creating Unit of Work instances.
#[async_trait::async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    /// Begin a new Unit of Work (transaction).
    async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError>;

    /// Begin a Unit of Work for queries. Stores that can refuse writes do so here.
    async fn begin_read_only<'p>(
        &'p self,
    ) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        self.begin().await
    }
}
