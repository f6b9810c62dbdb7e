use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models::{NewReading, ReadingPatch};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("temperature (Number) required")]
    TemperatureRequired,
    #[error("Query ?location= required")]
    LocationRequired,
}

/// Request body for `POST /readings`.
///
/// `temperature` is kept as raw JSON so a non-numeric value is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    /// Degrees Celsius. Required.
    #[schema(value_type = f64)]
    pub temperature: Option<Value>,
    /// Defaults to `"temperaturesensor"`.
    pub sensor_name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
}

impl CreateReadingRequest {
    pub fn validate(self) -> Result<NewReading, ValidationError> {
        let temperature = self
            .temperature
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or(ValidationError::TemperatureRequired)?;

        Ok(NewReading {
            sensor_name: self.sensor_name,
            address: self.address,
            location: self.location,
            temperature,
        })
    }
}

/// Request body for `PUT /readings/{id}`. Every field is optional; absent
/// fields keep their stored value. Unknown fields (including `id` and the
/// timestamps) are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadingRequest {
    /// Degrees Celsius. Must be numeric when present; `null` is rejected.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Value>,
    pub sensor_name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
}

impl UpdateReadingRequest {
    pub fn validate(self) -> Result<ReadingPatch, ValidationError> {
        let temperature = match self.temperature {
            None => None,
            Some(v) => Some(v.as_f64().ok_or(ValidationError::TemperatureRequired)?),
        };

        Ok(ReadingPatch {
            sensor_name: self.sensor_name,
            address: self.address,
            location: self.location,
            temperature,
        })
    }
}

/// Distinguishes an explicit `null` (`Some(Value::Null)`) from an absent
/// field (`None`, via `#[serde(default)]`).
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Response for `DELETE /readings/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    /// Free-text location, e.g. `"London"`.
    pub location: Option<String>,
}

impl WeatherQuery {
    pub fn location(&self) -> Result<&str, ValidationError> {
        self.location
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or(ValidationError::LocationRequired)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn create(body: Value) -> Result<NewReading, ValidationError> {
        serde_json::from_value::<CreateReadingRequest>(body)
            .unwrap()
            .validate()
    }

    fn update(body: Value) -> Result<ReadingPatch, ValidationError> {
        serde_json::from_value::<UpdateReadingRequest>(body)
            .unwrap()
            .validate()
    }

    #[test]
    fn create_accepts_integer_and_float_temperatures() {
        assert_eq!(create(json!({ "temperature": 21.5 })).unwrap().temperature, 21.5);
        assert_eq!(create(json!({ "temperature": -3 })).unwrap().temperature, -3.0);
    }

    #[test]
    fn create_rejects_missing_or_non_numeric_temperature() {
        for body in [
            json!({}),
            json!({ "temperature": "cold" }),
            json!({ "temperature": "21.5" }),
            json!({ "temperature": null }),
            json!({ "temperature": true }),
        ] {
            assert_eq!(create(body).unwrap_err(), ValidationError::TemperatureRequired);
        }
    }

    #[test]
    fn create_passes_optional_fields_through() {
        let new = create(json!({
            "temperature": 19,
            "sensorName": "attic",
            "location": "Roof"
        }))
        .unwrap();
        assert_eq!(new.sensor_name.as_deref(), Some("attic"));
        assert_eq!(new.location.as_deref(), Some("Roof"));
        assert_eq!(new.address, None);
    }

    #[test]
    fn update_distinguishes_absent_from_null_temperature() {
        assert_eq!(update(json!({ "location": "Lab" })).unwrap().temperature, None);
        assert_eq!(
            update(json!({ "temperature": null })).unwrap_err(),
            ValidationError::TemperatureRequired
        );
        assert_eq!(
            update(json!({ "temperature": "warm" })).unwrap_err(),
            ValidationError::TemperatureRequired
        );
        assert_eq!(update(json!({ "temperature": 4 })).unwrap().temperature, Some(4.0));
    }

    #[test]
    fn update_ignores_store_owned_fields() {
        let patch = update(json!({
            "id": "not-a-uuid",
            "createdAt": "2020-01-01T00:00:00Z",
            "address": "Main St"
        }))
        .unwrap();
        assert_eq!(patch.address.as_deref(), Some("Main St"));
        assert_eq!(patch.sensor_name, None);
    }

    #[test]
    fn weather_query_requires_non_empty_location() {
        let missing = WeatherQuery { location: None };
        let empty = WeatherQuery { location: Some(String::new()) };
        let ok = WeatherQuery { location: Some("Paris".to_owned()) };

        assert_eq!(missing.location().unwrap_err(), ValidationError::LocationRequired);
        assert_eq!(empty.location().unwrap_err(), ValidationError::LocationRequired);
        assert_eq!(ok.location().unwrap(), "Paris");
    }
}
