use async_trait::async_trait;
use stronghold_types::errors::ApplicationError;

use crate::{app::AppContext, uow::UnitOfWork};

/// Commands are operations that change the state of the system.
/// Every command targets a single village, whose writes are serialized.
pub trait Command: Send + Sync {
    /// The data type returned to the caller on success.
    type Output: Send + Sync;

    fn village_id(&self) -> u32;
}

/// A trait for handlers that execute Commands.
/// It receives the command and a Unit of Work (&Box<dyn UnitOfWork...>) to use.
/// It should NOT manage the transaction lifecycle (commit/rollback);
/// that is the job of the AppBus.
#[async_trait]
pub trait CommandHandler<C: Command> {
    async fn handle(
        &self,
        cmd: C,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<C::Output, ApplicationError>;
}
