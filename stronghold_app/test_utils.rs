#[cfg(not(tarpaulin_include))]
pub mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use stronghold_game::models::{catalog::BuildingCatalog, village::Village};
    use stronghold_types::errors::{AppError, ApplicationError, DbError};

    use crate::{
        app::{AppBus, AppContext},
        clock::ManualClock,
        config::Config,
        repository::VillageRepository,
        uow::{UnitOfWork, UnitOfWorkProvider},
    };

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    /// Context with the standard catalog and a manual clock.
    pub fn test_context(config: Config, clock: Arc<ManualClock>) -> AppContext {
        AppContext::new(
            Arc::new(config),
            Arc::new(BuildingCatalog::standard()),
            clock,
        )
    }

    /// Bus backed by a shared mock repository, plus handles to both.
    pub fn test_bus(config: Config) -> (Arc<AppBus>, Arc<MockVillageRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let provider = MockUnitOfWorkProvider::new();
        let villages = provider.villages();
        let bus = AppBus::new(test_context(config, clock.clone()), Arc::new(provider));
        (Arc::new(bus), villages, clock)
    }

    #[derive(Default, Clone)]
    pub struct MockVillageRepository {
        villages: Arc<Mutex<HashMap<u32, Village>>>,
    }

    impl MockVillageRepository {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn add_village(&self, village: Village) {
            self.villages.lock().unwrap().insert(village.id, village);
        }

        pub fn get(&self, village_id: u32) -> Option<Village> {
            self.villages.lock().unwrap().get(&village_id).cloned()
        }
    }

    #[async_trait]
    impl VillageRepository for MockVillageRepository {
        async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
            self.get(village_id)
                .ok_or(ApplicationError::Db(DbError::VillageNotFound(village_id)))
        }

        async fn get_for_update(&self, village_id: u32) -> Result<Village, ApplicationError> {
            self.get_by_id(village_id).await
        }

        async fn exists(&self, village_id: u32) -> Result<bool, ApplicationError> {
            Ok(self.villages.lock().unwrap().contains_key(&village_id))
        }

        async fn create(&self, village: &Village) -> Result<(), ApplicationError> {
            let mut villages = self.villages.lock().unwrap();
            if villages.contains_key(&village.id) {
                return Err(AppError::VillageAlreadyExists(village.id).into());
            }
            villages.insert(village.id, village.clone());
            Ok(())
        }

        async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
            self.add_village(village.clone());
            Ok(())
        }

        async fn list_with_due_upgrades(
            &self,
            now: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<u32>, ApplicationError> {
            let mut due: Vec<(DateTime<Utc>, u32)> = self
                .villages
                .lock()
                .unwrap()
                .values()
                .filter_map(|v| v.next_completion_at().map(|at| (at, v.id)))
                .filter(|(at, _)| *at <= now)
                .collect();
            due.sort();

            Ok(due
                .into_iter()
                .take(limit.max(0) as usize)
                .map(|(_, id)| id)
                .collect())
        }
    }

    #[derive(Default)]
    pub struct MockUnitOfWork {
        villages: Arc<MockVillageRepository>,

        // Flags to check if commit/rollback was called
        committed: Arc<Mutex<bool>>,
        rolled_back: Arc<Mutex<bool>>,
    }

    impl MockUnitOfWork {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn with_villages(villages: Arc<MockVillageRepository>) -> Self {
            Self {
                villages,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl<'a> UnitOfWork<'a> for MockUnitOfWork {
        fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
            self.villages.clone()
        }

        async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.committed.lock().unwrap() = true;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.rolled_back.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Hands out units of work sharing the same repository.
    #[derive(Default)]
    pub struct MockUnitOfWorkProvider {
        villages: Arc<MockVillageRepository>,
    }

    impl MockUnitOfWorkProvider {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn villages(&self) -> Arc<MockVillageRepository> {
            self.villages.clone()
        }
    }

    #[async_trait]
    impl UnitOfWorkProvider for MockUnitOfWorkProvider {
        async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
            let uow: Box<dyn UnitOfWork<'_> + '_> =
                Box::new(MockUnitOfWork::with_villages(self.villages.clone()));
            Ok(uow)
        }
    }
}
