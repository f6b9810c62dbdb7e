//! The `ReadingStore` seam between the HTTP layer and persistence.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{NewReading, Reading, ReadingPatch};

/// Errors surfaced by every store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,

    /// The store rejected the data (constraint violation).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations over the flat `readings` collection.
///
/// Implementations own id assignment and the `created_at`/`updated_at`
/// timestamps. Single-document writes are atomic; nothing spans documents.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// All readings, newest `created_at` first.
    async fn list_all(&self) -> StoreResult<Vec<Reading>>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Reading>;

    async fn create(&self, new: NewReading) -> StoreResult<Reading>;

    /// Merge `patch` into the stored reading and return the result.
    async fn update_by_id(&self, id: Uuid, patch: ReadingPatch) -> StoreResult<Reading>;

    /// Remove the reading and return its id.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Uuid>;

    /// The most recently created reading.
    async fn get_latest(&self) -> StoreResult<Reading>;
}
