use stronghold_types::errors::ApplicationError;

use crate::{
    app::AppContext,
    cqrs::{QueryHandler, queries::ListVillagesWithDueUpgrades},
    uow::UnitOfWork,
};

pub struct ListVillagesWithDueUpgradesHandler {}

impl Default for ListVillagesWithDueUpgradesHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ListVillagesWithDueUpgradesHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<ListVillagesWithDueUpgrades> for ListVillagesWithDueUpgradesHandler {
    async fn handle(
        &self,
        query: ListVillagesWithDueUpgrades,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &AppContext,
    ) -> Result<Vec<u32>, ApplicationError> {
        uow.villages()
            .list_with_due_upgrades(ctx.now(), query.limit)
            .await
    }
}
