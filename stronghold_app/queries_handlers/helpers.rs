use chrono::{DateTime, Utc};
use uuid::Uuid;

use stronghold_game::models::village::Village;
use stronghold_types::errors::ApplicationError;

use crate::{app::AppContext, uow::UnitOfWork};

/// Loads an owned village as it is at `now`: due upgrades are applied to the
/// returned copy only, nothing is written back.
pub(super) async fn current_village(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    ctx: &AppContext,
    village_id: u32,
    player_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Village, ApplicationError> {
    let mut village = uow.villages().get_by_id(village_id).await?;
    village.ensure_owner(player_id)?;
    village.process_due_upgrades(&ctx.catalog, now)?;
    Ok(village)
}
