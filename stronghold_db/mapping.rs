use stronghold_game::models as game_models;
use stronghold_types::errors::DbError;

use crate::models as db_models;

impl TryFrom<db_models::Village> for game_models::village::Village {
    type Error = DbError;

    fn try_from(db_village: db_models::Village) -> Result<Self, Self::Error> {
        let position = serde_json::from_value(db_village.position)?;
        let buildings = serde_json::from_value(db_village.buildings)?;
        let resources = serde_json::from_value(db_village.resources)?;

        Ok(game_models::village::Village::from_persistence(
            db_village.id as u32,
            db_village.name,
            db_village.player_id,
            db_village.world_id,
            position,
            buildings,
            resources,
            db_village.resources_updated_at,
        ))
    }
}
