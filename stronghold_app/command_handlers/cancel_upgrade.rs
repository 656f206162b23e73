use tracing::{info, instrument};

use stronghold_game::models::village::CancelResult;
use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{CommandHandler, commands::CancelUpgrade},
    uow::UnitOfWork,
};

pub struct CancelUpgradeCommandHandler {}

impl Default for CancelUpgradeCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelUpgradeCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CancelUpgrade> for CancelUpgradeCommandHandler {
    #[instrument(skip_all, fields(
        village_id = %command.village_id,
        building = %command.building,
    ))]
    async fn handle(
        &self,
        command: CancelUpgrade,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<CancelResult, ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_for_update(command.village_id).await?;
        village.ensure_owner(command.player_id)?;

        let now = ctx.now();
        // an upgrade that is already due gets completed, so there is nothing left to cancel
        village.process_due_upgrades(&ctx.catalog, now)?;

        let result = village.cancel_upgrade(
            &ctx.catalog,
            command.building,
            ctx.config.base_refund_rate,
            now,
        )?;
        village_repo.save(&village).await?;

        info!(
            refund_percentage = result.refund_percentage,
            "Building upgrade cancelled"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use std::sync::Arc;

    use stronghold_game::{
        models::{catalog::BuildingCatalog, village::Village},
        test_utils::{VillageFactoryOptions, village_factory},
    };
    use stronghold_types::{
        Result, buildings::BuildingName, common::ResourceGroup, errors::GameError,
    };

    use super::*;
    use crate::{
        app::AppContext,
        clock::ManualClock,
        config::Config,
        test_utils::tests::{MockUnitOfWork, t0},
        uow::UnitOfWork,
    };

    /// Catalog without base production, so balances only move through costs and refunds.
    fn still_context(clock: Arc<ManualClock>) -> AppContext {
        let mut catalog = BuildingCatalog::standard();
        catalog.base_production = ResourceGroup::default();
        AppContext::new(Arc::new(Config::default()), Arc::new(catalog), clock)
    }

    /// Town Hall 0 -> 1 started at t0 with exactly its cost in stock.
    fn upgrading_village(ctx: &AppContext) -> Village {
        let mut village = village_factory(VillageFactoryOptions {
            catalog: Some((*ctx.catalog).clone()),
            now: Some(t0()),
            ..Default::default()
        });
        for name in [
            BuildingName::TownHall,
            BuildingName::Woodcutter,
            BuildingName::Quarry,
            BuildingName::Farm,
        ] {
            village.set_building_level_for_test(name, 0);
        }
        village.set_resources_for_test(ResourceGroup::new(100, 100, 50, 20), t0());
        village
            .start_upgrade(&ctx.catalog, BuildingName::TownHall, 1, t0())
            .unwrap();
        village
    }

    fn command(village: &Village) -> CancelUpgrade {
        CancelUpgrade {
            player_id: village.player_id,
            village_id: village.id,
            building: BuildingName::TownHall,
        }
    }

    #[tokio::test]
    async fn test_cancel_upgrade_handler_halfway() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let ctx = still_context(clock.clone());
        let village = upgrading_village(&ctx);
        mock_uow.villages().save(&village).await?;

        clock.advance(Duration::seconds(150));
        let result = CancelUpgradeCommandHandler::new()
            .handle(command(&village), &mock_uow, &ctx)
            .await?;

        assert_eq!(result.refund_percentage, 25.0);
        assert_eq!(result.refund_amount, ResourceGroup::new(25, 25, 12, 5));
        assert_eq!(result.original_cost, ResourceGroup::new(100, 100, 50, 20));
        assert_eq!(result.cancelled_at, t0() + Duration::seconds(150));

        let saved = mock_uow.villages().get_by_id(village.id).await?;
        assert_eq!(saved.ledger().stored(), ResourceGroup::new(25, 25, 12, 5));
        let town_hall = saved.building(BuildingName::TownHall)?;
        assert!(!town_hall.is_upgrading());
        assert_eq!(town_hall.level(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_upgrade_handler_immediately() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let ctx = still_context(Arc::new(ManualClock::new(t0())));
        let village = upgrading_village(&ctx);
        mock_uow.villages().save(&village).await?;

        let result = CancelUpgradeCommandHandler::new()
            .handle(command(&village), &mock_uow, &ctx)
            .await?;

        assert_eq!(result.refund_percentage, 50.0);
        assert_eq!(result.refund_amount, ResourceGroup::new(50, 50, 25, 10));
        assert_eq!(result.time_remaining, 300);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_upgrade_handler_after_completion() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let ctx = still_context(clock.clone());
        let village = upgrading_village(&ctx);
        mock_uow.villages().save(&village).await?;

        clock.advance(Duration::seconds(300));
        let result = CancelUpgradeCommandHandler::new()
            .handle(command(&village), &mock_uow, &ctx)
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotUpgrading(
                BuildingName::TownHall
            )))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_upgrade_handler_idle_building() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let ctx = still_context(Arc::new(ManualClock::new(t0())));
        let village = upgrading_village(&ctx);
        mock_uow.villages().save(&village).await?;

        let result = CancelUpgradeCommandHandler::new()
            .handle(
                CancelUpgrade {
                    building: BuildingName::Wall,
                    ..command(&village)
                },
                &mock_uow,
                &ctx,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotUpgrading(
                BuildingName::Wall
            )))
        ));
        Ok(())
    }
}
