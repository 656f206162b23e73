use tracing::{debug, info, instrument};

use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{
        CommandHandler,
        commands::{ProcessConstructionQueue, QueueReport},
    },
    uow::UnitOfWork,
};

pub struct ProcessConstructionQueueCommandHandler {}

impl Default for ProcessConstructionQueueCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessConstructionQueueCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<ProcessConstructionQueue> for ProcessConstructionQueueCommandHandler {
    #[instrument(skip_all, fields(village_id = %command.village_id))]
    async fn handle(
        &self,
        command: ProcessConstructionQueue,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<QueueReport, ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_for_update(command.village_id).await?;
        if let Some(player_id) = command.player_id {
            village.ensure_owner(player_id)?;
        }

        let now = ctx.now();
        let completed = village.process_due_upgrades(&ctx.catalog, now)?;

        if completed.is_empty() {
            debug!("No due upgrades");
        } else {
            village_repo.save(&village).await?;
            info!(completed = completed.len(), "Construction queue processed");
        }

        Ok(QueueReport {
            completed,
            status: village.queue_status(now),
        })
    }
}
