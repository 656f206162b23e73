use tracing::{info, instrument};

use stronghold_game::models::village::Village;
use stronghold_types::errors::{AppError, ApplicationError};

use crate::{
    app::AppContext,
    cqrs::{CommandHandler, commands::RegisterVillage},
    uow::UnitOfWork,
};

pub struct RegisterVillageCommandHandler {}

impl Default for RegisterVillageCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterVillageCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<RegisterVillage> for RegisterVillageCommandHandler {
    #[instrument(skip_all, fields(
        village_id = %command.village_id,
        player_id = %command.player_id,
    ))]
    async fn handle(
        &self,
        command: RegisterVillage,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<Village, ApplicationError> {
        let village_repo = uow.villages();
        if village_repo.exists(command.village_id).await? {
            return Err(AppError::VillageAlreadyExists(command.village_id).into());
        }

        let village = Village::new(
            command.village_id,
            command.name,
            command.player_id,
            command.world_id,
            command.position,
            &ctx.catalog,
            ctx.config.starting_resources,
            ctx.now(),
        );
        village_repo.create(&village).await?;

        info!("Village registered");
        Ok(village)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use uuid::Uuid;

    use stronghold_types::{
        Result,
        buildings::BuildingName,
        common::{Position, ResourceGroup},
    };

    use super::*;
    use crate::{
        clock::ManualClock,
        config::Config,
        test_utils::tests::{MockUnitOfWork, t0, test_context},
        uow::UnitOfWork,
    };

    fn command() -> RegisterVillage {
        RegisterVillage {
            village_id: 42,
            player_id: Uuid::new_v4(),
            world_id: Uuid::new_v4(),
            name: "Northwatch".to_string(),
            position: Position { x: 3, y: -7 },
        }
    }

    #[tokio::test]
    async fn test_register_village_handler() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Config {
            starting_resources: ResourceGroup::new(500, 400, 300, 200),
            ..Default::default()
        };
        let ctx = test_context(config, Arc::new(ManualClock::new(t0())));

        let village = RegisterVillageCommandHandler::new()
            .handle(command(), &mock_uow, &ctx)
            .await?;

        let saved = mock_uow.villages().get_by_id(42).await?;
        assert_eq!(saved, village);
        assert_eq!(saved.ledger().stored(), ResourceGroup::new(500, 400, 300, 200));
        assert_eq!(saved.ledger().updated_at(), t0());
        assert_eq!(saved.building(BuildingName::TownHall)?.level(), 1);
        assert_eq!(saved.building(BuildingName::Stable)?.level(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_village_handler_twice() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let ctx = test_context(Config::default(), Arc::new(ManualClock::new(t0())));
        let handler = RegisterVillageCommandHandler::new();

        let first = handler.handle(command(), &mock_uow, &ctx).await?;
        let result = handler.handle(command(), &mock_uow, &ctx).await;

        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::VillageAlreadyExists(42)))
        ));
        assert_eq!(mock_uow.villages().get_by_id(42).await?, first);
        Ok(())
    }
}
