mod get_time_remaining;
mod get_upgrade_info;
mod get_village_resources;
mod helpers;
mod list_villages_with_due_upgrades;

pub use get_time_remaining::GetTimeRemainingHandler;
pub use get_upgrade_info::GetUpgradeInfoHandler;
pub use get_village_resources::GetVillageResourcesHandler;
pub use list_villages_with_due_upgrades::ListVillagesWithDueUpgradesHandler;
