use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

use stronghold_game::models::catalog::BuildingCatalog;
use stronghold_types::errors::ApplicationError;

use crate::{
    clock::Clock,
    config::Config,
    cqrs::{Command, CommandHandler, Query, QueryHandler},
    locks::VillageLocks,
    uow::UnitOfWorkProvider,
};

/// Shared, read-only dependencies handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub catalog: Arc<BuildingCatalog>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn new(config: Arc<Config>, catalog: Arc<BuildingCatalog>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            catalog,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// AppBus (Mediator)
/// This struct is the central entry point for all application logic.
/// It does not contain any business logic itself.
/// Its primary roles are:
/// 1. Serializing writes per village.
/// 2. Managing Unit of Work (transaction) lifecycles.
/// 3. Dispatching Commands and Queries to their respective handlers.
pub struct AppBus {
    context: AppContext,
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    locks: VillageLocks,
}

impl AppBus {
    pub fn new(context: AppContext, uow_provider: Arc<dyn UnitOfWorkProvider>) -> Self {
        Self {
            context,
            uow_provider,
            locks: VillageLocks::new(),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Executes a command.
    /// A command is an operation that modifies the system state.
    /// This method:
    /// - Takes the lock of the target village.
    /// - Begins a Unit of Work and passes it to the handler.
    /// - Commits the UoW if the handler succeeds, rolls it back otherwise.
    /// - Releases the village lock on every exit path.
    pub async fn execute<C, H>(&self, cmd: C, handler: H) -> Result<C::Output, ApplicationError>
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let village_id = cmd.village_id();
        let _guard = self.locks.acquire(village_id).await;
        debug!(village_id, "Village lock acquired");

        let uow = self.uow_provider.begin().await?;

        match handler.handle(cmd, &uow, &self.context).await {
            Ok(output) => {
                uow.commit().await?; // Commit on success
                Ok(output)
            }
            Err(e) => {
                // Rollback on failure, the handler error is what the caller sees
                if let Err(rollback_err) = uow.rollback().await {
                    error!(village_id, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Executes a query.
    /// A query is an operation that reads system state and returns data.
    /// It should *never* modify the state, so it takes no village lock and
    /// its transaction is *always* rolled back.
    pub async fn query<Q, H>(&self, query: Q, handler: H) -> Result<Q::Output, ApplicationError>
    where
        Q: Query,
        H: QueryHandler<Q>,
    {
        let uow = self.uow_provider.begin_read_only().await?;

        let result = handler.handle(query, &uow, &self.context).await;

        // Always rollback a query, as it should never write data.
        if let Err(rollback_err) = uow.rollback().await {
            error!(error = %rollback_err, "Rollback failed");
        }

        result
    }
}
