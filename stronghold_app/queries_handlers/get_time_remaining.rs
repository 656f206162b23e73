use stronghold_game::models::buildings::TimeRemaining;
use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{QueryHandler, queries::GetTimeRemaining},
    uow::UnitOfWork,
};

pub struct GetTimeRemainingHandler {}

impl Default for GetTimeRemainingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GetTimeRemainingHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetTimeRemaining> for GetTimeRemainingHandler {
    async fn handle(
        &self,
        query: GetTimeRemaining,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<TimeRemaining, ApplicationError> {
        let village = uow.villages().get_by_id(query.village_id).await?;
        village.ensure_owner(query.player_id)?;

        Ok(village.time_remaining(query.building, ctx.now())?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use std::sync::Arc;

    use stronghold_game::test_utils::{VillageFactoryOptions, village_factory};
    use stronghold_types::{Result, buildings::BuildingName, common::ResourceGroup};

    use super::*;
    use crate::{
        clock::ManualClock,
        config::Config,
        test_utils::tests::{MockUnitOfWork, t0, test_context},
        uow::UnitOfWork,
    };

    #[tokio::test]
    async fn test_get_time_remaining_handler() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let ctx = test_context(Config::default(), clock.clone());
        let mut village = village_factory(VillageFactoryOptions {
            now: Some(t0()),
            ..Default::default()
        });
        village.set_resources_for_test(ResourceGroup::splat(1000), t0());
        let started = village.start_upgrade(&ctx.catalog, BuildingName::Barracks, 1, t0())?;
        mock_uow.villages().save(&village).await?;

        let query = || GetTimeRemaining {
            player_id: village.player_id,
            village_id: village.id,
            building: BuildingName::Barracks,
        };

        clock.advance(Duration::seconds(90));
        let remaining = GetTimeRemainingHandler::new()
            .handle(query(), &mock_uow, &ctx)
            .await?;
        assert!(remaining.is_upgrading);
        assert_eq!(remaining.seconds, 510);
        assert_eq!(remaining.formatted, "08:30");
        assert_eq!(remaining.completion_time, Some(started.completion_time));
        assert!(!remaining.can_complete);

        clock.advance(Duration::seconds(1000));
        let remaining = GetTimeRemainingHandler::new()
            .handle(query(), &mock_uow, &ctx)
            .await?;
        assert_eq!(remaining.seconds, 0);
        assert!(remaining.can_complete);
        Ok(())
    }
}
