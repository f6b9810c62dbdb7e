pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use memory::InMemoryReadingStore;
pub use postgres::PgReadingStore;
pub use store::{ReadingStore, StoreError, StoreResult};

pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to the readings database")?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply readings schema")?;
    Ok(())
}
