use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use uuid::Uuid;

use stronghold_types::common::{Position, ResourceGroup};

use super::models::{catalog::BuildingCatalog, village::Village};

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub player_id: Option<Uuid>,
    pub world_id: Option<Uuid>,
    pub position: Option<Position>,
    pub catalog: Option<BuildingCatalog>,
    pub resources: Option<ResourceGroup>,
    pub now: Option<DateTime<Utc>>,
}

/// Fixed instant used as "now" by tests that don't care about the exact time.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let mut rng = rand::thread_rng();
    let id = options.id.unwrap_or_else(|| rng.gen_range(1..1_000_000));
    let default_name = format!("Village {}", rng.r#gen::<u16>());
    let position = options.position.unwrap_or(Position {
        x: rng.gen_range(-100..=100),
        y: rng.gen_range(-100..=100),
    });
    let catalog = options.catalog.unwrap_or_default();

    Village::new(
        id,
        options.name.unwrap_or(default_name),
        options.player_id.unwrap_or_else(Uuid::new_v4),
        options.world_id.unwrap_or_else(Uuid::new_v4),
        position,
        &catalog,
        options.resources.unwrap_or(ResourceGroup::splat(750)),
        options.now.unwrap_or_else(fixed_now),
    )
}
