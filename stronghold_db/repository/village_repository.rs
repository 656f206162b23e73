use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction, types::Json};
use std::sync::Arc;
use tokio::sync::Mutex;

use stronghold_app::repository::VillageRepository;
use stronghold_game::models::village::Village;
use stronghold_types::errors::{AppError, ApplicationError, DbError};

use crate::models as db_models;

/// Implements VillageRepository and operates on transactions.
#[derive(Clone)]
pub struct PostgresVillageRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
}

impl<'a> PostgresVillageRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Postgres>>>) -> Self {
        Self { tx }
    }

    async fn fetch(&self, village_id: u32, for_update: bool) -> Result<Village, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;

        let sql = if for_update {
            "SELECT * FROM villages WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT * FROM villages WHERE id = $1"
        };

        let db_village = sqlx::query_as::<_, db_models::Village>(sql)
            .bind(village_id as i32)
            .fetch_optional(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?
            .ok_or(ApplicationError::Db(DbError::VillageNotFound(village_id)))?;

        Ok(Village::try_from(db_village)?)
    }
}

#[async_trait::async_trait]
impl<'a> VillageRepository for PostgresVillageRepository<'a> {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        self.fetch(village_id, false).await
    }

    async fn get_for_update(&self, village_id: u32) -> Result<Village, ApplicationError> {
        self.fetch(village_id, true).await
    }

    async fn exists(&self, village_id: u32) -> Result<bool, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;

        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM villages WHERE id = $1)")
            .bind(village_id as i32)
            .fetch_one(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))
    }

    async fn create(&self, village: &Village) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;

        let inserted = sqlx::query(
            r#"
                INSERT INTO villages (
                    id, player_id, world_id, name, position, buildings,
                    resources, resources_updated_at, next_completion_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO NOTHING
                "#,
        )
        .bind(village.id as i32)
        .bind(village.player_id)
        .bind(village.world_id)
        .bind(&village.name)
        .bind(Json(&village.position))
        .bind(Json(village.buildings()))
        .bind(Json(village.ledger().stored()))
        .bind(village.ledger().updated_at())
        .bind(village.next_completion_at())
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?
        .rows_affected();

        if inserted == 0 {
            return Err(AppError::VillageAlreadyExists(village.id).into());
        }
        Ok(())
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;

        sqlx::query(
            r#"
                INSERT INTO villages (
                    id, player_id, world_id, name, position, buildings,
                    resources, resources_updated_at, next_completion_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO UPDATE
                SET
                    name = $4,
                    buildings = $6,
                    resources = $7,
                    resources_updated_at = $8,
                    next_completion_at = $9,
                    updated_at = NOW()
                "#,
        )
        .bind(village.id as i32)
        .bind(village.player_id)
        .bind(village.world_id)
        .bind(&village.name)
        .bind(Json(&village.position))
        .bind(Json(village.buildings()))
        .bind(Json(village.ledger().stored()))
        .bind(village.ledger().updated_at())
        .bind(village.next_completion_at())
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn list_with_due_upgrades(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<u32>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;

        let ids = sqlx::query_scalar::<_, i32>(
            r#"
                SELECT id FROM villages
                WHERE next_completion_at IS NOT NULL AND next_completion_at <= $1
                ORDER BY next_completion_at, id
                LIMIT $2
                "#,
        )
        .bind(now)
        .bind(limit.max(0))
        .fetch_all(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(ids.into_iter().map(|id| id as u32).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use std::sync::Arc;

    use stronghold_app::uow::UnitOfWorkProvider;
    use stronghold_game::{
        models::catalog::BuildingCatalog,
        test_utils::{VillageFactoryOptions, fixed_now, village_factory},
    };
    use stronghold_types::{
        Result,
        buildings::BuildingName,
        common::ResourceGroup,
        errors::{AppError, ApplicationError},
    };

    use crate::{establish_test_connection_pool, uow::PostgresUnitOfWorkProvider};

    #[tokio::test]
    async fn test_village_roundtrip_in_postgres() -> Result<()> {
        // Runs only against a database provided through TEST_DATABASE_URL.
        let Some(pool) = establish_test_connection_pool().await? else {
            return Ok(());
        };
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .map_err(|e| ApplicationError::Unknown(e.to_string()))?;

        let provider = Arc::new(PostgresUnitOfWorkProvider::new(pool));
        let catalog = BuildingCatalog::standard();
        let now = fixed_now();
        let mut village = village_factory(VillageFactoryOptions {
            resources: Some(ResourceGroup::splat(1000)),
            now: Some(now),
            ..Default::default()
        });
        village.start_upgrade(&catalog, BuildingName::Farm, 1, now)?;

        let uow = provider.begin().await?;
        uow.villages().save(&village).await?;
        let loaded = uow.villages().get_for_update(village.id).await?;
        assert_eq!(loaded, village);

        let due = uow
            .villages()
            .list_with_due_upgrades(now + Duration::hours(1), 1000)
            .await?;
        assert!(due.contains(&village.id));

        uow.rollback().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_does_not_overwrite_in_postgres() -> Result<()> {
        let Some(pool) = establish_test_connection_pool().await? else {
            return Ok(());
        };
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .map_err(|e| ApplicationError::Unknown(e.to_string()))?;

        let provider = Arc::new(PostgresUnitOfWorkProvider::new(pool));
        let village = village_factory(VillageFactoryOptions::default());
        let other = village_factory(VillageFactoryOptions {
            id: Some(village.id),
            ..Default::default()
        });

        let uow = provider.begin().await?;
        uow.villages().create(&village).await?;
        let result = uow.villages().create(&other).await;
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::VillageAlreadyExists(_)))
        ));
        assert_eq!(uow.villages().get_by_id(village.id).await?, village);

        uow.rollback().await?;
        Ok(())
    }
}
