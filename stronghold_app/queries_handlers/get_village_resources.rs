use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{
        QueryHandler,
        queries::{GetVillageResources, VillageResources},
    },
    uow::UnitOfWork,
};

use super::helpers::current_village;

pub struct GetVillageResourcesHandler {}

impl Default for GetVillageResourcesHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GetVillageResourcesHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetVillageResources> for GetVillageResourcesHandler {
    async fn handle(
        &self,
        query: GetVillageResources,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<VillageResources, ApplicationError> {
        let now = ctx.now();
        let village = current_village(uow, ctx, query.village_id, query.player_id, now).await?;
        let economy = village.economy(&ctx.catalog);

        Ok(VillageResources {
            village_id: village.id,
            resources: village.balances(&ctx.catalog, now),
            production: economy.production,
            capacity: economy.capacity,
            as_of: now,
        })
    }
}
