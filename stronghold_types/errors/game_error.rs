use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::buildings::BuildingName;

/// Errors for domain logic (game rules).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Unknown building type '{0}'")]
    InvalidBuildingType(String),

    #[error("Building {0} not found in village")]
    BuildingNotFound(BuildingName),

    #[error("Building {building} has already reached max level {max_level}")]
    BuildingMaxLevel {
        building: BuildingName,
        max_level: u8,
    },

    #[error("Building {0} is already being upgraded")]
    BuildingUpgrading(BuildingName),

    #[error("Not enough resources")]
    InsufficientResources,

    #[error("Town Hall level {required} required, current level is {current}")]
    TownHallRequired { required: u8, current: u8 },

    #[error("Building {0} is not being upgraded")]
    NotUpgrading(BuildingName),

    #[error("Upgrade of {building} not finished yet, completes at {completes_at}")]
    UpgradeNotFinished {
        building: BuildingName,
        completes_at: DateTime<Utc>,
    },

    #[error("Upgrade of {0} already finished and can only be completed")]
    UpgradeAlreadyFinished(BuildingName),

    #[error("Village {village_id} not owned by player {player_id:?}")]
    VillageNotOwned { village_id: u32, player_id: Uuid },
}
