use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stronghold_game::models::village::Village;
use stronghold_types::errors::ApplicationError;

#[async_trait]
pub trait VillageRepository: Send + Sync {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError>;

    /// Like `get_by_id`, but the village stays locked for writes until the
    /// unit of work ends.
    async fn get_for_update(&self, village_id: u32) -> Result<Village, ApplicationError>;

    async fn exists(&self, village_id: u32) -> Result<bool, ApplicationError>;

    /// Stores a new village. Fails with `VillageAlreadyExists` instead of
    /// overwriting when the id is taken.
    async fn create(&self, village: &Village) -> Result<(), ApplicationError>;

    async fn save(&self, village: &Village) -> Result<(), ApplicationError>;

    /// Villages whose earliest running upgrade completes at or before `now`.
    async fn list_with_due_upgrades(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<u32>, ApplicationError>;
}
