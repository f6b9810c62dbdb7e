use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{
    models::{NewReading, Reading, ReadingPatch},
    store::{ReadingStore, StoreError, StoreResult},
};

const COLUMNS: &str = "id, sensor_name, address, location, temperature, created_at, updated_at";

/// `ReadingStore` backed by the `readings` table.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn list_all(&self) -> StoreResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {COLUMNS} FROM readings ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Reading> {
        sqlx::query_as::<_, Reading>(&format!("SELECT {COLUMNS} FROM readings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewReading) -> StoreResult<Reading> {
        // Only supplied columns are listed so the table defaults fill the rest.
        let mut columns = vec!["temperature"];
        let mut values: Vec<String> = Vec::new();
        if let Some(v) = new.sensor_name {
            columns.push("sensor_name");
            values.push(v);
        }
        if let Some(v) = new.address {
            columns.push("address");
            values.push(v);
        }
        if let Some(v) = new.location {
            columns.push("location");
            values.push(v);
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO readings (");
        qb.push(columns.join(", "));
        qb.push(") VALUES (");
        {
            let mut separated = qb.separated(", ");
            separated.push_bind(new.temperature);
            for v in values {
                separated.push_bind(v);
            }
        }
        qb.push(") RETURNING ");
        qb.push(COLUMNS);

        let reading = qb
            .build_query_as::<Reading>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        debug!(id = %reading.id, "Inserted reading");
        Ok(reading)
    }

    async fn update_by_id(&self, id: Uuid, patch: ReadingPatch) -> StoreResult<Reading> {
        // Timestamps are maintained by the `readings_touch` trigger.
        sqlx::query_as::<_, Reading>(&format!(
            r#"
            UPDATE readings
               SET sensor_name = COALESCE($2, sensor_name),
                   address     = COALESCE($3, address),
                   location    = COALESCE($4, location),
                   temperature = COALESCE($5, temperature)
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.sensor_name)
        .bind(patch.address)
        .bind(patch.location)
        .bind(patch.temperature)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("DELETE FROM readings WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn get_latest(&self) -> StoreResult<Reading> {
        sqlx::query_as::<_, Reading>(&format!(
            "SELECT {COLUMNS} FROM readings ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::NotFound)
    }
}

/// Integrity-constraint violations (SQLSTATE class 23) are the store's
/// schema validation; everything else is an opaque database failure.
fn map_db_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.code().is_some_and(|c| c.starts_with("23")) => {
            StoreError::Validation(db.message().to_owned())
        }
        _ => StoreError::Database(e),
    }
}
