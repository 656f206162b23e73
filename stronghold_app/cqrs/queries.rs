use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_game::models::{buildings::TimeRemaining, requirements::UpgradeReport};
use stronghold_types::{buildings::BuildingName, common::ResourceGroup};

use crate::cqrs::Query;

/// Next-level cost, time and requirements of a building.
pub struct GetUpgradeInfo {
    pub player_id: Uuid,
    pub village_id: u32,
    pub building: BuildingName,
}

impl Query for GetUpgradeInfo {
    type Output = UpgradeReport;
}

/// Countdown of the running upgrade of a building.
pub struct GetTimeRemaining {
    pub player_id: Uuid,
    pub village_id: u32,
    pub building: BuildingName,
}

impl Query for GetTimeRemaining {
    type Output = TimeRemaining;
}

/// Balances reconciled at query time, with production and capacity.
pub struct GetVillageResources {
    pub player_id: Uuid,
    pub village_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageResources {
    pub village_id: u32,
    pub resources: ResourceGroup,
    /// Per hour.
    pub production: ResourceGroup,
    pub capacity: ResourceGroup,
    pub as_of: DateTime<Utc>,
}

impl Query for GetVillageResources {
    type Output = VillageResources;
}

/// Ids of villages with at least one upgrade past its completion time.
pub struct ListVillagesWithDueUpgrades {
    pub limit: i64,
}

impl Query for ListVillagesWithDueUpgrades {
    type Output = Vec<u32>;
}
