use std::sync::Arc;
use uuid::Uuid;

use stronghold_game::models::{
    buildings::TimeRemaining,
    requirements::UpgradeReport,
    village::{BuildingQueueStatus, CancelResult, UpgradeResult, Village},
};
use stronghold_types::{
    buildings::BuildingName,
    common::{Position, ResourceGroup},
    errors::ApplicationError,
};

use crate::{
    app::AppBus,
    command_handlers::{
        CancelUpgradeCommandHandler, CompleteUpgradeCommandHandler,
        ProcessConstructionQueueCommandHandler, RegisterVillageCommandHandler,
        StartUpgradeCommandHandler,
    },
    cqrs::{
        commands::{
            CancelUpgrade, CompleteUpgrade, ProcessConstructionQueue, QueueReport,
            RegisterVillage, StartUpgrade,
        },
        queries::{
            GetTimeRemaining, GetUpgradeInfo, GetVillageResources, ListVillagesWithDueUpgrades,
            VillageResources,
        },
    },
    queries_handlers::{
        GetTimeRemainingHandler, GetUpgradeInfoHandler, GetVillageResourcesHandler,
        ListVillagesWithDueUpgradesHandler,
    },
};

/// Entry point of the construction system.
///
/// Every operation goes through the [`AppBus`], so mutations on the same
/// village are serialized and each runs in its own unit of work.
#[derive(Clone)]
pub struct ConstructionQueueManager {
    bus: Arc<AppBus>,
}

impl ConstructionQueueManager {
    pub fn new(bus: Arc<AppBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> Arc<AppBus> {
        self.bus.clone()
    }

    pub async fn register_village(
        &self,
        village_id: u32,
        player_id: Uuid,
        world_id: Uuid,
        name: String,
        position: Position,
    ) -> Result<Village, ApplicationError> {
        let command = RegisterVillage {
            village_id,
            player_id,
            world_id,
            name,
            position,
        };
        self.bus
            .execute(command, RegisterVillageCommandHandler::new())
            .await
    }

    pub async fn start_upgrade(
        &self,
        player_id: Uuid,
        village_id: u32,
        building: BuildingName,
    ) -> Result<UpgradeResult, ApplicationError> {
        let command = StartUpgrade {
            player_id,
            village_id,
            building,
        };
        self.bus
            .execute(command, StartUpgradeCommandHandler::new())
            .await
    }

    pub async fn cancel_upgrade(
        &self,
        player_id: Uuid,
        village_id: u32,
        building: BuildingName,
    ) -> Result<CancelResult, ApplicationError> {
        let command = CancelUpgrade {
            player_id,
            village_id,
            building,
        };
        self.bus
            .execute(command, CancelUpgradeCommandHandler::new())
            .await
    }

    pub async fn complete_upgrade(
        &self,
        player_id: Uuid,
        village_id: u32,
        building: BuildingName,
    ) -> Result<UpgradeResult, ApplicationError> {
        let command = CompleteUpgrade {
            player_id,
            village_id,
            building,
        };
        self.bus
            .execute(command, CompleteUpgradeCommandHandler::new())
            .await
    }

    /// Completes every due upgrade. `player_id` is `None` for system callers.
    pub async fn process_queue(
        &self,
        player_id: Option<Uuid>,
        village_id: u32,
    ) -> Result<QueueReport, ApplicationError> {
        let command = ProcessConstructionQueue {
            player_id,
            village_id,
        };
        self.bus
            .execute(command, ProcessConstructionQueueCommandHandler::new())
            .await
    }

    pub async fn process_construction_queue(
        &self,
        player_id: Uuid,
        village_id: u32,
    ) -> Result<Vec<UpgradeResult>, ApplicationError> {
        Ok(self
            .process_queue(Some(player_id), village_id)
            .await?
            .completed)
    }

    /// Queue of every building, after due upgrades have been completed.
    pub async fn queue_status(
        &self,
        player_id: Uuid,
        village_id: u32,
    ) -> Result<Vec<BuildingQueueStatus>, ApplicationError> {
        Ok(self.process_queue(Some(player_id), village_id).await?.status)
    }

    pub async fn upgrade_info(
        &self,
        player_id: Uuid,
        village_id: u32,
        building: BuildingName,
    ) -> Result<UpgradeReport, ApplicationError> {
        let query = GetUpgradeInfo {
            player_id,
            village_id,
            building,
        };
        self.bus.query(query, GetUpgradeInfoHandler::new()).await
    }

    pub async fn time_remaining(
        &self,
        player_id: Uuid,
        village_id: u32,
        building: BuildingName,
    ) -> Result<TimeRemaining, ApplicationError> {
        let query = GetTimeRemaining {
            player_id,
            village_id,
            building,
        };
        self.bus.query(query, GetTimeRemainingHandler::new()).await
    }

    pub async fn village_resources(
        &self,
        player_id: Uuid,
        village_id: u32,
    ) -> Result<VillageResources, ApplicationError> {
        let query = GetVillageResources {
            player_id,
            village_id,
        };
        self.bus
            .query(query, GetVillageResourcesHandler::new())
            .await
    }

    pub async fn balances(
        &self,
        player_id: Uuid,
        village_id: u32,
    ) -> Result<ResourceGroup, ApplicationError> {
        Ok(self
            .village_resources(player_id, village_id)
            .await?
            .resources)
    }

    pub async fn villages_with_due_upgrades(
        &self,
        limit: i64,
    ) -> Result<Vec<u32>, ApplicationError> {
        self.bus
            .query(
                ListVillagesWithDueUpgrades { limit },
                ListVillagesWithDueUpgradesHandler::new(),
            )
            .await
    }
}
