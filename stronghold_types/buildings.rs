use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::GameError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub enum BuildingGroup {
    Infrastructure,
    Resources,
    Military,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingName {
    TownHall,
    Woodcutter,
    Quarry,
    Farm,
    GoldMine,
    Warehouse,
    Granary,
    Barracks,
    Stable,
    Wall,
}

impl BuildingName {
    pub const ALL: [BuildingName; 10] = [
        BuildingName::TownHall,
        BuildingName::Woodcutter,
        BuildingName::Quarry,
        BuildingName::Farm,
        BuildingName::GoldMine,
        BuildingName::Warehouse,
        BuildingName::Granary,
        BuildingName::Barracks,
        BuildingName::Stable,
        BuildingName::Wall,
    ];

    /// Identifier used in URLs and persistence, e.g. `town_hall`.
    pub fn key(&self) -> &'static str {
        match self {
            BuildingName::TownHall => "town_hall",
            BuildingName::Woodcutter => "woodcutter",
            BuildingName::Quarry => "quarry",
            BuildingName::Farm => "farm",
            BuildingName::GoldMine => "gold_mine",
            BuildingName::Warehouse => "warehouse",
            BuildingName::Granary => "granary",
            BuildingName::Barracks => "barracks",
            BuildingName::Stable => "stable",
            BuildingName::Wall => "wall",
        }
    }
}

impl fmt::Display for BuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildingName::TownHall => "Town Hall",
            BuildingName::Woodcutter => "Woodcutter",
            BuildingName::Quarry => "Quarry",
            BuildingName::Farm => "Farm",
            BuildingName::GoldMine => "Gold Mine",
            BuildingName::Warehouse => "Warehouse",
            BuildingName::Granary => "Granary",
            BuildingName::Barracks => "Barracks",
            BuildingName::Stable => "Stable",
            BuildingName::Wall => "Wall",
        };

        f.write_str(name)
    }
}

impl FromStr for BuildingName {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingName::ALL
            .into_iter()
            .find(|name| name.key() == s)
            .ok_or_else(|| GameError::InvalidBuildingType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_building_keys() {
        for name in BuildingName::ALL {
            assert_eq!(name.key().parse::<BuildingName>().unwrap(), name);
        }
        assert!(matches!(
            "castle".parse::<BuildingName>(),
            Err(GameError::InvalidBuildingType(s)) if s == "castle"
        ));
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&BuildingName::GoldMine).unwrap();
        assert_eq!(json, "\"gold_mine\"");
    }
}
