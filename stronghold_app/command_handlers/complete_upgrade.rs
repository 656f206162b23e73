use tracing::{info, instrument};

use stronghold_game::models::village::UpgradeResult;
use stronghold_types::errors::{ApplicationError, GameError};

use crate::{
    app::AppContext,
    cqrs::{CommandHandler, commands::CompleteUpgrade},
    uow::UnitOfWork,
};

pub struct CompleteUpgradeCommandHandler {}

impl Default for CompleteUpgradeCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompleteUpgradeCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CompleteUpgrade> for CompleteUpgradeCommandHandler {
    #[instrument(skip_all, fields(
        village_id = %command.village_id,
        building = %command.building,
    ))]
    async fn handle(
        &self,
        command: CompleteUpgrade,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<UpgradeResult, ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_for_update(command.village_id).await?;
        village.ensure_owner(command.player_id)?;

        let now = ctx.now();
        let result = if village.building(command.building)?.is_due(now) {
            // upgrades that finished earlier are applied first, in completion order
            village
                .process_due_upgrades(&ctx.catalog, now)?
                .into_iter()
                .find(|r| r.building == command.building)
                .ok_or(GameError::NotUpgrading(command.building))?
        } else {
            village.complete_upgrade(&ctx.catalog, command.building, now)?
        };
        village_repo.save(&village).await?;

        info!(new_level = result.new_level, "Building upgrade completed");
        Ok(result)
    }
}
