use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Sensor name stored when a reading is created without one.
pub const DEFAULT_SENSOR_NAME: &str = "temperaturesensor";

/// A single stored temperature observation.
///
/// `id`, `created_at` and `updated_at` are owned by the store: they are
/// assigned on insert and maintained on update, never supplied by callers.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: Uuid,
    pub sensor_name: String,
    pub address: String,
    pub location: String,
    /// Degrees Celsius
    pub temperature: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when inserting a reading. Omitted optionals fall back to
/// the store defaults (`DEFAULT_SENSOR_NAME`, empty address and location).
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub sensor_name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub temperature: f64,
}

#[cfg(test)]
impl NewReading {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            sensor_name: None,
            address: None,
            location: None,
            temperature,
        }
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingPatch {
    pub sensor_name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub temperature: Option<f64>,
}

impl ReadingPatch {
    /// Merge this patch into `reading` in place.
    pub fn apply(self, reading: &mut Reading) {
        if let Some(v) = self.sensor_name {
            reading.sensor_name = v;
        }
        if let Some(v) = self.address {
            reading.address = v;
        }
        if let Some(v) = self.location {
            reading.location = v;
        }
        if let Some(v) = self.temperature {
            reading.temperature = v;
        }
    }
}
