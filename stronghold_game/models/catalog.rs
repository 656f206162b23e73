use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

use stronghold_types::{
    buildings::{BuildingGroup, BuildingName},
    common::{ResourceGroup, ResourceKind},
    errors::{AppError, GameError},
};

/// Neutral value for per mille speed modifiers.
pub const NEUTRAL_SPEED: u16 = 1000;

/// Static configuration of a building at one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingConfig {
    pub level: u8,
    pub cost: ResourceGroup,
    /// Base construction time in seconds, before speed modifiers.
    pub build_time: u32,
    /// Hourly production of the produced resource at this level.
    #[serde(default)]
    pub production: u32,
    /// Storage contributed to each stored resource at this level.
    #[serde(default)]
    pub storage: u32,
    /// Per mille factor applied to other buildings' construction time.
    #[serde(default = "neutral_speed")]
    pub construction_speed: u16,
    /// Per mille factor applied to unit training time.
    #[serde(default = "neutral_speed")]
    pub training_speed: u16,
}

fn neutral_speed() -> u16 {
    NEUTRAL_SPEED
}

/// How the Town Hall level limits the upgrade of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TownHallGate {
    Ungated,
    /// Town Hall must be at least at the target level.
    MatchTarget,
    /// Town Hall must be at least `(target - 1) / n`.
    EveryNLevels(u8),
}

impl TownHallGate {
    pub fn required_level(&self, target_level: u8) -> u8 {
        match self {
            TownHallGate::Ungated => 0,
            TownHallGate::MatchTarget => target_level,
            TownHallGate::EveryNLevels(n) => target_level.saturating_sub(1) / (*n).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingBlueprint {
    pub group: BuildingGroup,
    /// Level the building has when a village is registered.
    pub initial_level: u8,
    pub town_hall_gate: TownHallGate,
    #[serde(default)]
    pub produces: Option<ResourceKind>,
    #[serde(default)]
    pub stores: Vec<ResourceKind>,
    /// Configuration for levels `1..=max_level`, in order.
    pub levels: Vec<BuildingConfig>,
}

impl BuildingBlueprint {
    pub fn max_level(&self) -> u8 {
        self.levels.len() as u8
    }

    pub fn level(&self, level: u8) -> Option<&BuildingConfig> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }
}

/// Immutable table of per-(building, level) configuration.
/// Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    /// Hourly production every village has regardless of buildings.
    pub base_production: ResourceGroup,
    /// Storage every village has regardless of buildings.
    pub base_storage: ResourceGroup,
    buildings: BTreeMap<BuildingName, BuildingBlueprint>,
}

impl BuildingCatalog {
    pub fn new(
        base_production: ResourceGroup,
        base_storage: ResourceGroup,
        buildings: BTreeMap<BuildingName, BuildingBlueprint>,
    ) -> Result<Self, AppError> {
        let catalog = Self {
            base_production,
            base_storage,
            buildings,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let catalog: BuildingCatalog =
            serde_json::from_str(json).map_err(|e| AppError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::InvalidCatalog(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), AppError> {
        if !self.buildings.contains_key(&BuildingName::TownHall) {
            return Err(AppError::InvalidCatalog(
                "catalog must define a town_hall".to_string(),
            ));
        }

        for (name, blueprint) in &self.buildings {
            if blueprint.levels.is_empty() || blueprint.levels.len() > u8::MAX as usize {
                return Err(AppError::InvalidCatalog(format!(
                    "{} must define between 1 and 255 levels",
                    name.key()
                )));
            }
            if blueprint.initial_level > blueprint.max_level() {
                return Err(AppError::InvalidCatalog(format!(
                    "{} initial level is above its max level",
                    name.key()
                )));
            }
            if let TownHallGate::EveryNLevels(0) = blueprint.town_hall_gate {
                return Err(AppError::InvalidCatalog(format!(
                    "{} gate step must be positive",
                    name.key()
                )));
            }
            for (idx, config) in blueprint.levels.iter().enumerate() {
                if config.level as usize != idx + 1 {
                    return Err(AppError::InvalidCatalog(format!(
                        "{} levels must be listed in order starting at 1",
                        name.key()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn blueprint(&self, name: BuildingName) -> Result<&BuildingBlueprint, GameError> {
        self.buildings
            .get(&name)
            .ok_or_else(|| GameError::InvalidBuildingType(name.key().to_string()))
    }

    pub fn blueprints(&self) -> impl Iterator<Item = (BuildingName, &BuildingBlueprint)> {
        self.buildings.iter().map(|(name, bp)| (*name, bp))
    }

    pub fn max_level(&self, name: BuildingName) -> Result<u8, GameError> {
        Ok(self.blueprint(name)?.max_level())
    }

    /// Returns the configuration for a level, `None` for level 0, levels above max or unknown types.
    pub fn get_config(&self, name: BuildingName, level: u8) -> Option<&BuildingConfig> {
        self.buildings.get(&name).and_then(|bp| bp.level(level))
    }

    fn config_for_target(
        &self,
        name: BuildingName,
        target_level: u8,
    ) -> Result<&BuildingConfig, GameError> {
        let blueprint = self.blueprint(name)?;
        blueprint
            .level(target_level)
            .ok_or(GameError::BuildingMaxLevel {
                building: name,
                max_level: blueprint.max_level(),
            })
    }

    pub fn cost(&self, name: BuildingName, target_level: u8) -> Result<ResourceGroup, GameError> {
        Ok(self.config_for_target(name, target_level)?.cost)
    }

    /// Base construction time in seconds for reaching `target_level`.
    pub fn duration(&self, name: BuildingName, target_level: u8) -> Result<u32, GameError> {
        Ok(self.config_for_target(name, target_level)?.build_time)
    }

    /// Construction time after the Town Hall modifier and server speed, at least one second.
    pub fn effective_duration(
        &self,
        name: BuildingName,
        target_level: u8,
        town_hall_level: u8,
        server_speed: u8,
    ) -> Result<u32, GameError> {
        let base = self.duration(name, target_level)? as u64;

        let factor = if name == BuildingName::TownHall {
            NEUTRAL_SPEED
        } else {
            self.get_config(BuildingName::TownHall, town_hall_level)
                .map_or(NEUTRAL_SPEED, |c| c.construction_speed)
        };

        let secs = base * factor as u64 / (NEUTRAL_SPEED as u64 * server_speed.max(1) as u64);
        Ok(secs.max(1) as u32)
    }

    /// The Town Hall level needed to upgrade `name` to `target_level`.
    pub fn town_hall_requirement(
        &self,
        name: BuildingName,
        target_level: u8,
    ) -> Result<u8, GameError> {
        Ok(self
            .blueprint(name)?
            .town_hall_gate
            .required_level(target_level))
    }

    /// The catalog used by default: ten building types with geometric growth.
    pub fn standard() -> Self {
        let entries = [
            StandardEntry {
                name: BuildingName::TownHall,
                group: BuildingGroup::Infrastructure,
                initial_level: 1,
                gate: TownHallGate::Ungated,
                produces: None,
                stores: &[],
                cost: ResourceGroup::new(100, 100, 50, 20),
                build_time: 300,
                value: 0,
            },
            StandardEntry {
                name: BuildingName::Woodcutter,
                group: BuildingGroup::Resources,
                initial_level: 1,
                gate: TownHallGate::EveryNLevels(2),
                produces: Some(ResourceKind::Wood),
                stores: &[],
                cost: ResourceGroup::new(40, 100, 50, 10),
                build_time: 180,
                value: 10,
            },
            StandardEntry {
                name: BuildingName::Quarry,
                group: BuildingGroup::Resources,
                initial_level: 1,
                gate: TownHallGate::EveryNLevels(2),
                produces: Some(ResourceKind::Stone),
                stores: &[],
                cost: ResourceGroup::new(80, 40, 80, 10),
                build_time: 180,
                value: 10,
            },
            StandardEntry {
                name: BuildingName::Farm,
                group: BuildingGroup::Resources,
                initial_level: 1,
                gate: TownHallGate::EveryNLevels(2),
                produces: Some(ResourceKind::Food),
                stores: &[],
                cost: ResourceGroup::new(70, 90, 70, 10),
                build_time: 180,
                value: 10,
            },
            StandardEntry {
                name: BuildingName::GoldMine,
                group: BuildingGroup::Resources,
                initial_level: 0,
                gate: TownHallGate::EveryNLevels(2),
                produces: Some(ResourceKind::Gold),
                stores: &[],
                cost: ResourceGroup::new(100, 80, 30, 0),
                build_time: 240,
                value: 5,
            },
            StandardEntry {
                name: BuildingName::Warehouse,
                group: BuildingGroup::Infrastructure,
                initial_level: 1,
                gate: TownHallGate::EveryNLevels(2),
                produces: None,
                stores: &[ResourceKind::Wood, ResourceKind::Stone, ResourceKind::Gold],
                cost: ResourceGroup::new(130, 160, 90, 40),
                build_time: 240,
                value: 400,
            },
            StandardEntry {
                name: BuildingName::Granary,
                group: BuildingGroup::Infrastructure,
                initial_level: 1,
                gate: TownHallGate::EveryNLevels(2),
                produces: None,
                stores: &[ResourceKind::Food],
                cost: ResourceGroup::new(80, 100, 70, 20),
                build_time: 240,
                value: 400,
            },
            StandardEntry {
                name: BuildingName::Barracks,
                group: BuildingGroup::Military,
                initial_level: 0,
                gate: TownHallGate::MatchTarget,
                produces: None,
                stores: &[],
                cost: ResourceGroup::new(210, 140, 260, 120),
                build_time: 600,
                value: 0,
            },
            StandardEntry {
                name: BuildingName::Stable,
                group: BuildingGroup::Military,
                initial_level: 0,
                gate: TownHallGate::MatchTarget,
                produces: None,
                stores: &[],
                cost: ResourceGroup::new(260, 140, 220, 100),
                build_time: 900,
                value: 0,
            },
            StandardEntry {
                name: BuildingName::Wall,
                group: BuildingGroup::Military,
                initial_level: 0,
                gate: TownHallGate::MatchTarget,
                produces: None,
                stores: &[],
                cost: ResourceGroup::new(70, 90, 170, 70),
                build_time: 420,
                value: 0,
            },
        ];

        let buildings = entries
            .iter()
            .map(|entry| (entry.name, entry.blueprint()))
            .collect::<BTreeMap<_, _>>();

        Self {
            base_production: ResourceGroup::splat(5),
            base_storage: ResourceGroup::splat(800),
            buildings,
        }
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD_MAX_LEVEL: u8 = 20;
const COST_GROWTH: f64 = 1.28;
const TIME_GROWTH: f64 = 1.25;
const PRODUCTION_GROWTH: f64 = 1.35;
const STORAGE_GROWTH: f64 = 1.3;
const SPEED_STEP: u16 = 25;

struct StandardEntry {
    name: BuildingName,
    group: BuildingGroup,
    initial_level: u8,
    gate: TownHallGate,
    produces: Option<ResourceKind>,
    stores: &'static [ResourceKind],
    cost: ResourceGroup,
    build_time: u32,
    /// Level 1 production or storage.
    value: u32,
}

impl StandardEntry {
    fn blueprint(&self) -> BuildingBlueprint {
        let levels = (1..=STANDARD_MAX_LEVEL)
            .map(|level| self.level_config(level))
            .collect();

        BuildingBlueprint {
            group: self.group,
            initial_level: self.initial_level,
            town_hall_gate: self.gate,
            produces: self.produces,
            stores: self.stores.to_vec(),
            levels,
        }
    }

    fn level_config(&self, level: u8) -> BuildingConfig {
        let step = (level - 1) as i32;
        let grow = |base: u32, rate: f64, round: u32| round_to(base as f64 * rate.powi(step), round);

        let cost = ResourceGroup::new(
            grow(self.cost.wood(), COST_GROWTH, 5),
            grow(self.cost.stone(), COST_GROWTH, 5),
            grow(self.cost.food(), COST_GROWTH, 5),
            grow(self.cost.gold(), COST_GROWTH, 5),
        );
        let build_time = grow(self.build_time, TIME_GROWTH, 1);

        let production = if self.produces.is_some() {
            grow(self.value, PRODUCTION_GROWTH, 1)
        } else {
            0
        };
        let storage = if self.stores.is_empty() {
            0
        } else {
            grow(self.value, STORAGE_GROWTH, 100)
        };

        let speed_bonus = NEUTRAL_SPEED - SPEED_STEP * (level as u16 - 1);
        let construction_speed = match self.name {
            BuildingName::TownHall => speed_bonus,
            _ => NEUTRAL_SPEED,
        };
        let training_speed = match self.name {
            BuildingName::Barracks | BuildingName::Stable => speed_bonus,
            _ => NEUTRAL_SPEED,
        };

        BuildingConfig {
            level,
            cost,
            build_time,
            production,
            storage,
            construction_speed,
            training_speed,
        }
    }
}

fn round_to(value: f64, step: u32) -> u32 {
    let step = step.max(1) as f64;
    ((value / step).round() * step) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_town_hall_first_level() {
        let catalog = BuildingCatalog::standard();
        let config = catalog.get_config(BuildingName::TownHall, 1).unwrap();

        assert_eq!(config.cost, ResourceGroup::new(100, 100, 50, 20));
        assert_eq!(config.build_time, 300);
        assert_eq!(config.construction_speed, NEUTRAL_SPEED);
    }

    #[test]
    fn test_no_config_outside_level_range() {
        let catalog = BuildingCatalog::standard();
        assert!(catalog.get_config(BuildingName::Farm, 0).is_none());
        assert!(catalog.get_config(BuildingName::Farm, 20).is_some());
        assert!(catalog.get_config(BuildingName::Farm, 21).is_none());

        assert!(matches!(
            catalog.cost(BuildingName::Farm, 21),
            Err(GameError::BuildingMaxLevel {
                building: BuildingName::Farm,
                max_level: 20
            })
        ));
    }

    #[test]
    fn test_costs_grow_with_level() {
        let catalog = BuildingCatalog::standard();
        for (name, _) in catalog.blueprints() {
            let mut previous = 0;
            for level in 1..=catalog.max_level(name).unwrap() {
                let total = catalog.cost(name, level).unwrap().total();
                assert!(total > previous, "{name} level {level} should cost more");
                previous = total;
            }
        }
    }

    #[test]
    fn test_unknown_building_type() {
        let mut buildings = BTreeMap::new();
        buildings.insert(
            BuildingName::TownHall,
            BuildingCatalog::standard()
                .blueprint(BuildingName::TownHall)
                .unwrap()
                .clone(),
        );
        let catalog =
            BuildingCatalog::new(ResourceGroup::default(), ResourceGroup::splat(100), buildings)
                .unwrap();

        assert!(matches!(
            catalog.cost(BuildingName::Wall, 1),
            Err(GameError::InvalidBuildingType(s)) if s == "wall"
        ));
    }

    #[test]
    fn test_effective_duration_applies_town_hall_and_speed() {
        let catalog = BuildingCatalog::standard();
        let base = catalog.duration(BuildingName::Barracks, 1).unwrap();
        assert_eq!(base, 600);

        // Town Hall level 1 is neutral
        assert_eq!(
            catalog
                .effective_duration(BuildingName::Barracks, 1, 1, 1)
                .unwrap(),
            600
        );
        // Town Hall level 5: 1000 - 4 * 25 = 900 per mille
        assert_eq!(
            catalog
                .effective_duration(BuildingName::Barracks, 1, 5, 1)
                .unwrap(),
            540
        );
        // Server speed divides the time
        assert_eq!(
            catalog
                .effective_duration(BuildingName::Barracks, 1, 5, 3)
                .unwrap(),
            180
        );
        // Town Hall ignores its own modifier
        assert_eq!(
            catalog
                .effective_duration(BuildingName::TownHall, 1, 5, 1)
                .unwrap(),
            300
        );
    }

    #[test]
    fn test_town_hall_gates() {
        assert_eq!(TownHallGate::Ungated.required_level(10), 0);
        assert_eq!(TownHallGate::MatchTarget.required_level(3), 3);
        assert_eq!(TownHallGate::EveryNLevels(2).required_level(1), 0);
        assert_eq!(TownHallGate::EveryNLevels(2).required_level(2), 0);
        assert_eq!(TownHallGate::EveryNLevels(2).required_level(3), 1);
        assert_eq!(TownHallGate::EveryNLevels(2).required_level(10), 4);
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let catalog = BuildingCatalog::standard();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(BuildingCatalog::from_json(&json).unwrap(), catalog);

        let broken = r#"{"base_production":[0,0,0,0],"base_storage":[0,0,0,0],"buildings":{}}"#;
        assert!(matches!(
            BuildingCatalog::from_json(broken),
            Err(AppError::InvalidCatalog(_))
        ));
    }
}
