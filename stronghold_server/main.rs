use std::{sync::Arc, time::Duration};

use stronghold_app::{
    app::{AppBus, AppContext},
    clock::SystemClock,
    config::Config,
    construction::ConstructionQueueManager,
    sweeper::QueueSweeper,
    uow::UnitOfWorkProvider,
};
use stronghold_db::{
    establish_connection_pool, memory::InMemoryUnitOfWorkProvider, uow::PostgresUnitOfWorkProvider,
};
use stronghold_game::models::catalog::BuildingCatalog;
use stronghold_types::{Result, errors::ApplicationError};
use stronghold_web::{AppState, WebRouter};

mod logs;
use logs::setup_logging;

/// Villages processed per sweep.
const SWEEP_BATCH_SIZE: i64 = 100;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    let config = Arc::new(Config::from_env());
    let _log_guard = setup_logging(&config.log_dir);
    let manager = setup_app(config.clone()).await?;

    let sweeper = Arc::new(QueueSweeper::new(
        manager.clone(),
        Duration::from_secs(config.sweep_interval_secs),
        SWEEP_BATCH_SIZE,
    ));
    sweeper.run();

    WebRouter::serve(AppState::new(manager), config.http_port).await
}

async fn setup_app(config: Arc<Config>) -> Result<ConstructionQueueManager, ApplicationError> {
    let catalog = Arc::new(load_catalog(&config)?);
    let uow_provider = setup_storage(&config).await?;

    let context = AppContext::new(config, catalog, Arc::new(SystemClock));
    let app_bus = Arc::new(AppBus::new(context, uow_provider));

    Ok(ConstructionQueueManager::new(app_bus))
}

fn load_catalog(config: &Config) -> Result<BuildingCatalog, ApplicationError> {
    match &config.catalog_path {
        Some(path) => {
            tracing::info!("Loading building catalog from {}", path);
            Ok(BuildingCatalog::from_file(path)?)
        }
        None => Ok(BuildingCatalog::standard()),
    }
}

async fn setup_storage(config: &Config) -> Result<Arc<dyn UnitOfWorkProvider>, ApplicationError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, villages are kept in memory only");
        return Ok(Arc::new(InMemoryUnitOfWorkProvider::new()));
    };

    let db_pool = establish_connection_pool(database_url).await?;

    sqlx::migrate!("../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| ApplicationError::Unknown(e.to_string()))?;

    Ok(Arc::new(PostgresUnitOfWorkProvider::new(db_pool)))
}
