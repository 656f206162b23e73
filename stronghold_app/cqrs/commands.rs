use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_game::models::village::{
    BuildingQueueStatus, CancelResult, UpgradeResult, Village,
};
use stronghold_types::{buildings::BuildingName, common::Position};

use crate::cqrs::Command;

/// World-join hook: creates a village with every building at its initial level.
#[derive(Debug, Clone)]
pub struct RegisterVillage {
    pub village_id: u32,
    pub player_id: Uuid,
    pub world_id: Uuid,
    pub name: String,
    pub position: Position,
}

impl Command for RegisterVillage {
    type Output = Village;

    fn village_id(&self) -> u32 {
        self.village_id
    }
}

#[derive(Debug, Clone)]
pub struct StartUpgrade {
    pub player_id: Uuid,
    pub village_id: u32,
    pub building: BuildingName,
}

impl Command for StartUpgrade {
    type Output = UpgradeResult;

    fn village_id(&self) -> u32 {
        self.village_id
    }
}

#[derive(Debug, Clone)]
pub struct CancelUpgrade {
    pub player_id: Uuid,
    pub village_id: u32,
    pub building: BuildingName,
}

impl Command for CancelUpgrade {
    type Output = CancelResult;

    fn village_id(&self) -> u32 {
        self.village_id
    }
}

#[derive(Debug, Clone)]
pub struct CompleteUpgrade {
    pub player_id: Uuid,
    pub village_id: u32,
    pub building: BuildingName,
}

impl Command for CompleteUpgrade {
    type Output = UpgradeResult;

    fn village_id(&self) -> u32 {
        self.village_id
    }
}

/// Completes every due upgrade of a village.
/// `player_id` is `None` when the sweeper runs it on behalf of the system.
#[derive(Debug, Clone)]
pub struct ProcessConstructionQueue {
    pub player_id: Option<Uuid>,
    pub village_id: u32,
}

/// Upgrades completed by a queue run, and the queue right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueReport {
    pub completed: Vec<UpgradeResult>,
    pub status: Vec<BuildingQueueStatus>,
}

impl Command for ProcessConstructionQueue {
    type Output = QueueReport;

    fn village_id(&self) -> u32 {
        self.village_id
    }
}
