use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stronghold_types::{buildings::BuildingName, common::ResourceGroup, errors::GameError};

use super::{catalog::BuildingCatalog, village::Village};

/// Everything a client needs to decide whether to offer an upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeReport {
    pub building: BuildingName,
    pub current_level: u8,
    pub next_level: Option<u8>,
    pub max_level: u8,
    pub cost: Option<ResourceGroup>,
    /// Effective construction time in seconds.
    pub upgrade_time: Option<u32>,
    pub can_afford: bool,
    pub town_hall_required: u8,
    pub town_hall_current: u8,
    pub town_hall_requirement_met: bool,
    pub is_upgrading: bool,
    pub can_upgrade: bool,
}

/// Checks whether a building may be upgraded. Never mutates the village.
pub struct RequirementValidator<'a> {
    catalog: &'a BuildingCatalog,
}

impl<'a> RequirementValidator<'a> {
    pub fn new(catalog: &'a BuildingCatalog) -> Self {
        Self { catalog }
    }

    /// Fails with the first unmet requirement: max level, upgrade in flight,
    /// Town Hall level, then affordability.
    pub fn validate(
        &self,
        village: &Village,
        name: BuildingName,
        target_level: u8,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let cost = self.catalog.cost(name, target_level)?;

        if village.building(name)?.is_upgrading() {
            return Err(GameError::BuildingUpgrading(name));
        }

        let required = self.catalog.town_hall_requirement(name, target_level)?;
        let current = village.town_hall_level();
        if current < required {
            return Err(GameError::TownHallRequired { required, current });
        }

        if !village.balances(self.catalog, now).covers(&cost) {
            return Err(GameError::InsufficientResources);
        }

        Ok(())
    }

    pub fn report(
        &self,
        village: &Village,
        name: BuildingName,
        server_speed: u8,
        now: DateTime<Utc>,
    ) -> Result<UpgradeReport, GameError> {
        let building = village.building(name)?;
        let current_level = building.level();
        let max_level = self.catalog.max_level(name)?;
        let town_hall_current = village.town_hall_level();

        let next_level = (current_level < max_level).then(|| current_level + 1);
        let (cost, upgrade_time, town_hall_required) = match next_level {
            Some(target) => (
                Some(self.catalog.cost(name, target)?),
                Some(self.catalog.effective_duration(
                    name,
                    target,
                    town_hall_current,
                    server_speed,
                )?),
                self.catalog.town_hall_requirement(name, target)?,
            ),
            None => (None, None, 0),
        };

        let can_afford = cost.is_some_and(|c| village.balances(self.catalog, now).covers(&c));
        let can_upgrade = match next_level {
            Some(target) => self.validate(village, name, target, now).is_ok(),
            None => false,
        };

        Ok(UpgradeReport {
            building: name,
            current_level,
            next_level,
            max_level,
            cost,
            upgrade_time,
            can_afford,
            town_hall_required,
            town_hall_current,
            town_hall_requirement_met: town_hall_current >= town_hall_required,
            is_upgrading: building.is_upgrading(),
            can_upgrade,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::test_utils::{VillageFactoryOptions, village_factory};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn rich_village(catalog: &BuildingCatalog) -> Village {
        let mut village = village_factory(VillageFactoryOptions {
            catalog: Some(catalog.clone()),
            now: Some(t0()),
            ..Default::default()
        });
        village.set_resources_for_test(ResourceGroup::splat(1200), t0());
        village
    }

    #[test]
    fn test_validate_max_level_first() {
        let catalog = BuildingCatalog::standard();
        let mut village = rich_village(&catalog);
        village.set_building_level_for_test(BuildingName::Farm, 20);

        let result = RequirementValidator::new(&catalog).validate(
            &village,
            BuildingName::Farm,
            21,
            t0(),
        );

        assert!(matches!(
            result,
            Err(GameError::BuildingMaxLevel {
                building: BuildingName::Farm,
                max_level: 20
            })
        ));
    }

    #[test]
    fn test_validate_town_hall_requirement() {
        let catalog = BuildingCatalog::standard();
        let mut village = rich_village(&catalog);
        let validator = RequirementValidator::new(&catalog);

        // barracks level 2 needs town hall level 2
        village.set_building_level_for_test(BuildingName::Barracks, 1);
        let result = validator.validate(&village, BuildingName::Barracks, 2, t0());
        assert!(matches!(
            result,
            Err(GameError::TownHallRequired {
                required: 2,
                current: 1
            })
        ));

        // farm level 2 has no requirement yet
        assert!(
            validator
                .validate(&village, BuildingName::Farm, 2, t0())
                .is_ok()
        );
    }

    #[test]
    fn test_validate_affordability_last() {
        let catalog = BuildingCatalog::standard();
        let mut village = rich_village(&catalog);
        village.set_resources_for_test(ResourceGroup::default(), t0());
        village.set_building_level_for_test(BuildingName::Barracks, 1);

        // town hall check wins over affordability
        assert!(matches!(
            RequirementValidator::new(&catalog).validate(
                &village,
                BuildingName::Barracks,
                2,
                t0()
            ),
            Err(GameError::TownHallRequired { .. })
        ));
        assert!(matches!(
            RequirementValidator::new(&catalog).validate(
                &village,
                BuildingName::Farm,
                2,
                t0()
            ),
            Err(GameError::InsufficientResources)
        ));
    }

    #[test]
    fn test_report_for_fresh_building() {
        let catalog = BuildingCatalog::standard();
        let village = rich_village(&catalog);

        let report = RequirementValidator::new(&catalog)
            .report(&village, BuildingName::Barracks, 1, t0())
            .unwrap();

        assert_eq!(report.current_level, 0);
        assert_eq!(report.next_level, Some(1));
        assert_eq!(report.max_level, 20);
        assert_eq!(report.cost, Some(ResourceGroup::new(210, 140, 260, 120)));
        assert_eq!(report.upgrade_time, Some(600));
        assert_eq!(report.town_hall_required, 1);
        assert_eq!(report.town_hall_current, 1);
        assert!(report.town_hall_requirement_met);
        assert!(report.can_afford);
        assert!(!report.is_upgrading);
        assert!(report.can_upgrade);
    }

    #[test]
    fn test_report_at_max_level() {
        let catalog = BuildingCatalog::standard();
        let mut village = rich_village(&catalog);
        village.set_building_level_for_test(BuildingName::Wall, 20);

        let report = RequirementValidator::new(&catalog)
            .report(&village, BuildingName::Wall, 1, t0())
            .unwrap();

        assert_eq!(report.next_level, None);
        assert_eq!(report.cost, None);
        assert!(!report.can_afford);
        assert!(!report.can_upgrade);
    }

    #[test]
    fn test_report_while_upgrading() {
        let catalog = BuildingCatalog::standard();
        let mut village = rich_village(&catalog);
        village
            .start_upgrade(&catalog, BuildingName::Farm, 1, t0())
            .unwrap();

        let report = RequirementValidator::new(&catalog)
            .report(&village, BuildingName::Farm, 1, t0())
            .unwrap();

        assert!(report.is_upgrading);
        assert!(!report.can_upgrade);
        assert_eq!(report.current_level, 1);
    }
}
