use stronghold_game::models::requirements::{RequirementValidator, UpgradeReport};
use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{QueryHandler, queries::GetUpgradeInfo},
    uow::UnitOfWork,
};

use super::helpers::current_village;

pub struct GetUpgradeInfoHandler {}

impl Default for GetUpgradeInfoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GetUpgradeInfoHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetUpgradeInfo> for GetUpgradeInfoHandler {
    async fn handle(
        &self,
        query: GetUpgradeInfo,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<UpgradeReport, ApplicationError> {
        let now = ctx.now();
        let village = current_village(uow, ctx, query.village_id, query.player_id, now).await?;

        Ok(RequirementValidator::new(&ctx.catalog).report(
            &village,
            query.building,
            ctx.config.speed,
            now,
        )?)
    }
}
