use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use stronghold_app::{
    repository::VillageRepository,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use stronghold_game::models::village::Village;
use stronghold_types::errors::{AppError, ApplicationError, DbError};

type VillageMap = HashMap<u32, Village>;

/// Process-local storage, used when no database is configured.
///
/// Writes are staged inside the unit of work and only become visible to
/// other units of work on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUnitOfWorkProvider {
    store: Arc<Mutex<VillageMap>>,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new() -> Self {
        Default::default()
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.store.clone(),
            staged: Arc::new(Mutex::new(HashMap::new())),
        }))
    }
}

pub struct InMemoryUnitOfWork {
    store: Arc<Mutex<VillageMap>>,
    staged: Arc<Mutex<VillageMap>>,
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for InMemoryUnitOfWork {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        Arc::new(InMemoryVillageRepository {
            store: self.store.clone(),
            staged: self.staged.clone(),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        let staged = std::mem::take(&mut *self.staged.lock().await);
        self.store.lock().await.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        self.staged.lock().await.clear();
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryVillageRepository {
    store: Arc<Mutex<VillageMap>>,
    staged: Arc<Mutex<VillageMap>>,
}

impl InMemoryVillageRepository {
    async fn find(&self, village_id: u32) -> Option<Village> {
        if let Some(village) = self.staged.lock().await.get(&village_id) {
            return Some(village.clone());
        }
        self.store.lock().await.get(&village_id).cloned()
    }
}

#[async_trait::async_trait]
impl VillageRepository for InMemoryVillageRepository {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        self.find(village_id)
            .await
            .ok_or(ApplicationError::Db(DbError::VillageNotFound(village_id)))
    }

    async fn get_for_update(&self, village_id: u32) -> Result<Village, ApplicationError> {
        // Writers on the same village are already serialized by the bus.
        self.get_by_id(village_id).await
    }

    async fn exists(&self, village_id: u32) -> Result<bool, ApplicationError> {
        Ok(self.find(village_id).await.is_some())
    }

    async fn create(&self, village: &Village) -> Result<(), ApplicationError> {
        let mut staged = self.staged.lock().await;
        if staged.contains_key(&village.id) || self.store.lock().await.contains_key(&village.id) {
            return Err(AppError::VillageAlreadyExists(village.id).into());
        }
        staged.insert(village.id, village.clone());
        Ok(())
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        self.staged.lock().await.insert(village.id, village.clone());
        Ok(())
    }

    async fn list_with_due_upgrades(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<u32>, ApplicationError> {
        let mut visible = self.store.lock().await.clone();
        visible.extend(self.staged.lock().await.clone());

        let mut due: Vec<(DateTime<Utc>, u32)> = visible
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
