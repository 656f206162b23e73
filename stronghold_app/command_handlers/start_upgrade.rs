use tracing::{info, instrument};

use stronghold_game::models::{requirements::RequirementValidator, village::UpgradeResult};
use stronghold_types::errors::{AppError, ApplicationError, GameError};

use crate::{
    app::AppContext,
    cqrs::{CommandHandler, commands::StartUpgrade},
    uow::UnitOfWork,
};

pub struct StartUpgradeCommandHandler {}

impl Default for StartUpgradeCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StartUpgradeCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<StartUpgrade> for StartUpgradeCommandHandler {
    #[instrument(skip_all, fields(
        village_id = %command.village_id,
        building = %command.building,
    ))]
    async fn handle(
        &self,
        command: StartUpgrade,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<UpgradeResult, ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_for_update(command.village_id).await?;
        village.ensure_owner(command.player_id)?;

        let now = ctx.now();
        let catalog = &ctx.catalog;
        village.process_due_upgrades(catalog, now)?;

        let level = village.building(command.building)?.level();
        let target_level = level.checked_add(1).ok_or(GameError::BuildingMaxLevel {
            building: command.building,
            max_level: level,
        })?;
        RequirementValidator::new(catalog).validate(&village, command.building, target_level, now)?;

        if let Some(limit) = ctx.config.max_concurrent_upgrades {
            if village.upgrading_count() >= limit {
                return Err(AppError::QueueLimitReached {
                    queue: "construction",
                    limit,
                }
                .into());
            }
        }

        let result = village.start_upgrade(catalog, command.building, ctx.config.speed, now)?;
        village_repo.save(&village).await?;

        info!(
            new_level = result.new_level,
            completion_time = %result.completion_time,
            "Building upgrade started"
        );
        Ok(result)
    }
}
