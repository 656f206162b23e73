use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;

use stronghold_types::errors::DbError;

pub type DbPool = PgPool;

pub async fn establish_connection_pool(database_url: &str) -> Result<DbPool, DbError> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?)
}

/// Pool on `TEST_DATABASE_URL`, or `None` when it is not set.
pub async fn establish_test_connection_pool() -> Result<Option<DbPool>, DbError> {
    dotenvy::dotenv().ok();

    match env::var("TEST_DATABASE_URL") {
        Ok(url) => Ok(Some(establish_connection_pool(&url).await?)),
        Err(_) => Ok(None),
    }
}
