mod cancel_upgrade;
mod complete_upgrade;
mod process_construction_queue;
mod register_village;
mod start_upgrade;

pub use cancel_upgrade::CancelUpgradeCommandHandler;
pub use complete_upgrade::CompleteUpgradeCommandHandler;
pub use process_construction_queue::ProcessConstructionQueueCommandHandler;
pub use register_village::RegisterVillageCommandHandler;
pub use start_upgrade::StartUpgradeCommandHandler;
