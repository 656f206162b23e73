use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_types::{
    buildings::BuildingName,
    common::{Position, ResourceGroup},
    errors::GameError,
};

use super::{
    buildings::{Building, TimeRemaining},
    catalog::BuildingCatalog,
    ledger::{ResourceLedger, VillageEconomy},
    requirements::RequirementValidator,
};

/// Returned when an upgrade starts or completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeResult {
    pub building: BuildingName,
    pub previous_level: u8,
    pub new_level: u8,
    pub completion_time: DateTime<Utc>,
    pub costs: ResourceGroup,
}

/// Returned when an upgrade is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelResult {
    pub building_type: BuildingName,
    pub level: u8,
    pub refund_amount: ResourceGroup,
    pub refund_percentage: f64,
    pub original_cost: ResourceGroup,
    pub cancelled_at: DateTime<Utc>,
    pub time_remaining: u64,
    pub refund_reason: String,
}

/// One row of the construction queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingQueueStatus {
    pub building: BuildingName,
    pub level: u8,
    pub is_upgrading: bool,
    pub target_level: Option<u8>,
    pub completion_time: Option<DateTime<Utc>>,
    pub time_remaining: u64,
    pub can_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub name: String,
    pub player_id: Uuid,
    pub world_id: Uuid,
    pub position: Position,
    buildings: Vec<Building>,
    ledger: ResourceLedger,
}

impl Village {
    /// Returns a new village with every catalog building at its initial level.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        name: String,
        player_id: Uuid,
        world_id: Uuid,
        position: Position,
        catalog: &BuildingCatalog,
        starting_resources: ResourceGroup,
        now: DateTime<Utc>,
    ) -> Self {
        let buildings = catalog
            .blueprints()
            .map(|(name, blueprint)| Building::new(name, blueprint.initial_level))
            .collect();

        let mut village = Self {
            id,
            name,
            player_id,
            world_id,
            position,
            buildings,
            ledger: ResourceLedger::new(ResourceGroup::default(), now),
        };
        village.credit(catalog, &starting_resources, now);
        village
    }

    /// Constructor for re-hydrating a Village from persistence (database).
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: u32,
        name: String,
        player_id: Uuid,
        world_id: Uuid,
        position: Position,
        buildings: Vec<Building>,
        stored: ResourceGroup,
        resources_updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            player_id,
            world_id,
            position,
            buildings,
            ledger: ResourceLedger::new(stored, resources_updated_at),
        }
    }

    pub fn ensure_owner(&self, player_id: Uuid) -> Result<(), GameError> {
        if self.player_id != player_id {
            return Err(GameError::VillageNotOwned {
                village_id: self.id,
                player_id,
            });
        }
        Ok(())
    }

    /// Returns a reference to the village buildings for persistence (serialization).
    pub fn buildings(&self) -> &Vec<Building> {
        &self.buildings
    }

    /// Returns a reference to the resource ledger for persistence (serialization).
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn building(&self, name: BuildingName) -> Result<&Building, GameError> {
        self.buildings
            .iter()
            .find(|b| b.name == name)
            .ok_or(GameError::BuildingNotFound(name))
    }

    fn building_mut(&mut self, name: BuildingName) -> Result<&mut Building, GameError> {
        self.buildings
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or(GameError::BuildingNotFound(name))
    }

    pub fn town_hall_level(&self) -> u8 {
        self.building(BuildingName::TownHall)
            .map_or(0, |b| b.level())
    }

    /// Number of buildings currently upgrading.
    pub fn upgrading_count(&self) -> usize {
        self.buildings.iter().filter(|b| b.is_upgrading()).count()
    }

    /// Production and storage derived from the current building levels.
    pub fn economy(&self, catalog: &BuildingCatalog) -> VillageEconomy {
        let mut production = catalog.base_production;
        let mut capacity = catalog.base_storage;

        for building in &self.buildings {
            let Ok(blueprint) = catalog.blueprint(building.name) else {
                continue;
            };
            let Some(config) = blueprint.level(building.level()) else {
                continue;
            };

            if let Some(kind) = blueprint.produces {
                let rate = production.get_mut(kind);
                *rate = rate.saturating_add(config.production);
            }
            for kind in &blueprint.stores {
                let limit = capacity.get_mut(*kind);
                *limit = limit.saturating_add(config.storage);
            }
        }

        VillageEconomy {
            production,
            capacity,
        }
    }

    /// Balances at `now` without touching the ledger.
    pub fn balances(&self, catalog: &BuildingCatalog, now: DateTime<Utc>) -> ResourceGroup {
        let mut ledger = self.ledger.clone();
        ledger.reconcile(&self.economy(catalog), now)
    }

    /// Brings the ledger up to `now` and returns the balances.
    pub fn reconcile(&mut self, catalog: &BuildingCatalog, now: DateTime<Utc>) -> ResourceGroup {
        let economy = self.economy(catalog);
        self.ledger.reconcile(&economy, now)
    }

    pub fn debit(
        &mut self,
        catalog: &BuildingCatalog,
        cost: &ResourceGroup,
        now: DateTime<Utc>,
    ) -> Result<ResourceGroup, GameError> {
        let economy = self.economy(catalog);
        self.ledger.debit(cost, &economy, now)
    }

    pub fn credit(
        &mut self,
        catalog: &BuildingCatalog,
        amounts: &ResourceGroup,
        now: DateTime<Utc>,
    ) -> ResourceGroup {
        let economy = self.economy(catalog);
        self.ledger.credit(amounts, &economy, now)
    }

    /// Validates, charges and schedules the upgrade of `name` to its next level.
    pub fn start_upgrade(
        &mut self,
        catalog: &BuildingCatalog,
        name: BuildingName,
        server_speed: u8,
        now: DateTime<Utc>,
    ) -> Result<UpgradeResult, GameError> {
        let previous_level = self.building(name)?.level();
        let target_level = previous_level
            .checked_add(1)
            .ok_or(GameError::BuildingMaxLevel {
                building: name,
                max_level: previous_level,
            })?;

        RequirementValidator::new(catalog).validate(self, name, target_level, now)?;

        let cost = catalog.cost(name, target_level)?;
        let duration =
            catalog.effective_duration(name, target_level, self.town_hall_level(), server_speed)?;

        self.debit(catalog, &cost, now)?;

        let scheduled = self
            .building_mut(name)
            .and_then(|b| b.start_upgrade(cost, duration, now).map(|u| u.completes_at));

        let completion_time = match scheduled {
            Ok(completes_at) => completes_at,
            Err(err) => {
                // unreachable while validation checks the building first;
                // the charge is restored if scheduling ever fails anyway
                self.credit(catalog, &cost, now);
                return Err(err);
            }
        };

        Ok(UpgradeResult {
            building: name,
            previous_level,
            new_level: target_level,
            completion_time,
            costs: cost,
        })
    }

    /// Finishes a due upgrade of `name`.
    ///
    /// Production is settled at the completion instant with the old levels, so the
    /// new level only yields from that moment on.
    pub fn complete_upgrade(
        &mut self,
        catalog: &BuildingCatalog,
        name: BuildingName,
        now: DateTime<Utc>,
    ) -> Result<UpgradeResult, GameError> {
        let building = self.building(name)?;
        let previous_level = building.level();
        let upgrade = building
            .upgrade()
            .cloned()
            .ok_or(GameError::NotUpgrading(name))?;

        if upgrade.is_due(now) {
            self.reconcile(catalog, upgrade.completes_at);
        }
        let new_level = self.building_mut(name)?.complete(now)?;

        Ok(UpgradeResult {
            building: name,
            previous_level,
            new_level,
            completion_time: upgrade.completes_at,
            costs: upgrade.cost,
        })
    }

    /// Cancels the upgrade of `name` and credits the refund back.
    pub fn cancel_upgrade(
        &mut self,
        catalog: &BuildingCatalog,
        name: BuildingName,
        base_refund_rate: f64,
        now: DateTime<Utc>,
    ) -> Result<CancelResult, GameError> {
        let building = self.building_mut(name)?;
        let refund = building.cancel(now, base_refund_rate)?;
        let level = building.level();

        self.credit(catalog, &refund.amount, now);

        Ok(CancelResult {
            building_type: name,
            level,
            refund_amount: refund.amount,
            refund_percentage: refund.percentage,
            original_cost: refund.original_cost,
            cancelled_at: now,
            time_remaining: refund.time_remaining_secs,
            refund_reason: format!(
                "Cancelled with {:.0}% of construction time remaining",
                refund.remaining_fraction * 100.0
            ),
        })
    }

    /// Completes every due upgrade in completion order. Calling it again at the same
    /// instant is a no-op.
    pub fn process_due_upgrades(
        &mut self,
        catalog: &BuildingCatalog,
        now: DateTime<Utc>,
    ) -> Result<Vec<UpgradeResult>, GameError> {
        let mut due: Vec<(DateTime<Utc>, BuildingName)> = self
            .buildings
            .iter()
            .filter_map(|b| {
                b.upgrade()
                    .filter(|u| u.is_due(now))
                    .map(|u| (u.completes_at, b.name))
            })
            .collect();
        due.sort();

        due.into_iter()
            .map(|(_, name)| self.complete_upgrade(catalog, name, now))
            .collect()
    }

    /// Earliest completion time among the running upgrades.
    pub fn next_completion_at(&self) -> Option<DateTime<Utc>> {
        self.buildings
            .iter()
            .filter_map(|b| b.upgrade().map(|u| u.completes_at))
            .min()
    }

    /// Whether any building has an upgrade past its completion time.
    pub fn has_due_upgrades(&self, now: DateTime<Utc>) -> bool {
        self.buildings.iter().any(|b| b.is_due(now))
    }

    pub fn time_remaining(
        &self,
        name: BuildingName,
        now: DateTime<Utc>,
    ) -> Result<TimeRemaining, GameError> {
        Ok(self.building(name)?.time_remaining(now))
    }

    pub fn queue_status(&self, now: DateTime<Utc>) -> Vec<BuildingQueueStatus> {
        self.buildings
            .iter()
            .map(|b| {
                let remaining = b.time_remaining(now);
                BuildingQueueStatus {
                    building: b.name,
                    level: b.level(),
                    is_upgrading: remaining.is_upgrading,
                    target_level: b.upgrade().map(|u| u.target_level),
                    completion_time: remaining.completion_time,
                    time_remaining: remaining.seconds,
                    can_complete: remaining.can_complete,
                }
            })
            .collect()
    }

    #[cfg(any(test, feature = "test-utils"))]
    /// **[TEST ONLY]** Set the level of a building, clearing any upgrade.
    pub fn set_building_level_for_test(&mut self, name: BuildingName, level: u8) {
        match self.buildings.iter_mut().find(|b| b.name == name) {
            Some(b) => *b = Building::new(name, level),
            None => self.buildings.push(Building::new(name, level)),
        }
    }

    #[cfg(any(test, feature = "test-utils"))]
    /// **[TEST ONLY]** Overwrite the stored resources, reconciled at `now`.
    pub fn set_resources_for_test(&mut self, resources: ResourceGroup, now: DateTime<Utc>) {
        self.ledger = ResourceLedger::new(resources, now);
    }
}
