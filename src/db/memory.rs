use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    models::{NewReading, Reading, ReadingPatch, DEFAULT_SENSOR_NAME},
    store::{ReadingStore, StoreError, StoreResult},
};

/// Non-persistent `ReadingStore` with the same defaults, timestamping and
/// ordering rules as the Postgres table.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Readings are kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn list_all(&self) -> StoreResult<Vec<Reading>> {
        let guard = self.inner.read().await;
        // Reverse first so the stable sort keeps later inserts ahead on
        // identical timestamps.
        let mut rows: Vec<Reading> = guard.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Reading> {
        self.inner
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewReading) -> StoreResult<Reading> {
        if !new.temperature.is_finite() {
            return Err(StoreError::Validation(
                "temperature must be a finite number".to_owned(),
            ));
        }

        let now = Utc::now();
        let reading = Reading {
            id: Uuid::new_v4(),
            sensor_name: new
                .sensor_name
                .unwrap_or_else(|| DEFAULT_SENSOR_NAME.to_owned()),
            address: new.address.unwrap_or_default(),
            location: new.location.unwrap_or_default(),
            temperature: new.temperature,
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.push(reading.clone());
        Ok(reading)
    }

    async fn update_by_id(&self, id: Uuid, patch: ReadingPatch) -> StoreResult<Reading> {
        if patch.temperature.is_some_and(|t| !t.is_finite()) {
            return Err(StoreError::Validation(
                "temperature must be a finite number".to_owned(),
            ));
        }

        let mut guard = self.inner.write().await;
        let reading = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;

        patch.apply(reading);
        reading.updated_at = reading.updated_at.max(Utc::now());
        Ok(reading.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Uuid> {
        let mut guard = self.inner.write().await;
        let idx = guard
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(guard.remove(idx).id)
    }

    async fn get_latest(&self) -> StoreResult<Reading> {
        self.list_all()
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }
}
