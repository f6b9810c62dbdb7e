pub mod models;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use self::models::{first_text, WttrResponse};

/// Current conditions for a location, normalized from the provider's first
/// result. Numeric fields are `null` when the provider sent something that
/// does not parse as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// Resolved location name, e.g. `"London, United Kingdom"`.
    pub location: Option<String>,
    pub observation_time: Option<String>,
    /// Sky description, e.g. `"Partly cloudy"`.
    pub skytext: Option<String>,
    pub temperature_c: Option<f64>,
    pub feelslike_c: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
}

/// A source of current weather conditions for a free-text location.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn lookup(&self, location: &str) -> Result<WeatherReport>;
}

// ---------------------------------------------------------------------------
// wttr.in client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WttrClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
}

impl WttrClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                base_url: base_url.to_owned(),
            }),
        }
    }

    /// `{base_url}/{location}?format=j1` with `location` encoded as a single
    /// path segment.
    fn lookup_url(&self, location: &str) -> Result<Url> {
        let mut url = Url::parse(&self.inner.base_url)
            .with_context(|| format!("invalid weather base URL: {}", self.inner.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("weather base URL cannot have path segments"))?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url)
    }
}

#[async_trait]
impl WeatherProvider for WttrClient {
    async fn lookup(&self, location: &str) -> Result<WeatherReport> {
        let url = self.lookup_url(location)?;
        debug!(location = %location, url = %url, "Requesting current weather");

        let resp = self
            .inner
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<WttrResponse>()
            .await?;

        normalize(resp)
    }
}

/// Map the provider's first result onto a `WeatherReport`.
pub fn normalize(resp: WttrResponse) -> Result<WeatherReport> {
    let current = resp
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No weather result"))?;

    let location = resp.nearest_area.first().and_then(|area| {
        let name = first_text(&area.area_name)?;
        Some(match first_text(&area.country) {
            Some(country) => format!("{name}, {country}"),
            None => name.to_owned(),
        })
    });

    Ok(WeatherReport {
        location,
        observation_time: current.local_obs_date_time.or(current.observation_time),
        skytext: first_text(&current.weather_desc).map(str::to_owned),
        temperature_c: parse_number(current.temp_c.as_deref()),
        feelslike_c: parse_number(current.feels_like_c.as_deref()),
        humidity: parse_number(current.humidity.as_deref()),
    })
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "current_condition": [{
            "FeelsLikeC": "12",
            "humidity": "82",
            "localObsDateTime": "2024-05-01 10:41 AM",
            "observation_time": "09:41 AM",
            "temp_C": "14",
            "weatherDesc": [{ "value": "Partly cloudy" }]
        }],
        "nearest_area": [{
            "areaName": [{ "value": "London" }],
            "country": [{ "value": "United Kingdom" }]
        }],
        "weather": []
    }"#;

    fn parse(json: &str) -> WttrResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalizes_first_result() {
        let report = normalize(parse(LONDON)).unwrap();
        assert_eq!(report.location.as_deref(), Some("London, United Kingdom"));
        assert_eq!(report.observation_time.as_deref(), Some("2024-05-01 10:41 AM"));
        assert_eq!(report.skytext.as_deref(), Some("Partly cloudy"));
        assert_eq!(report.temperature_c, Some(14.0));
        assert_eq!(report.feelslike_c, Some(12.0));
        assert_eq!(report.humidity, Some(82.0));
    }

    #[test]
    fn serializes_with_client_keys() {
        let json = serde_json::to_value(normalize(parse(LONDON)).unwrap()).unwrap();
        assert_eq!(json["temperatureC"], 14.0);
        assert_eq!(json["feelslikeC"], 12.0);
        assert_eq!(json["observationTime"], "2024-05-01 10:41 AM");
        assert_eq!(json["skytext"], "Partly cloudy");
    }

    #[test]
    fn empty_result_is_an_error() {
        let err = normalize(parse(r#"{"current_condition": [], "nearest_area": []}"#)).unwrap_err();
        assert_eq!(err.to_string(), "No weather result");
    }

    #[test]
    fn missing_sections_are_an_error() {
        assert!(normalize(parse("{}")).is_err());
    }

    #[test]
    fn non_numeric_values_become_null() {
        let report = normalize(parse(
            r#"{"current_condition": [{"temp_C": "n/a", "humidity": "", "observation_time": "01:00 PM"}]}"#,
        ))
        .unwrap();
        assert_eq!(report.temperature_c, None);
        assert_eq!(report.feelslike_c, None);
        assert_eq!(report.humidity, None);
        assert_eq!(report.location, None);
        assert_eq!(report.skytext, None);
        assert_eq!(report.observation_time.as_deref(), Some("01:00 PM"));
    }

    #[test]
    fn area_without_country_uses_name_only() {
        let report = normalize(parse(
            r#"{"current_condition": [{}], "nearest_area": [{"areaName": [{"value": "Oslo"}]}]}"#,
        ))
        .unwrap();
        assert_eq!(report.location.as_deref(), Some("Oslo"));
    }

    #[test]
    fn lookup_url_encodes_location_as_one_segment() {
        let client = WttrClient::new("https://wttr.in");
        let url = client.lookup_url("New York/NY").unwrap();
        assert_eq!(url.as_str(), "https://wttr.in/New%20York%2FNY?format=j1");
    }

    #[test]
    fn lookup_url_keeps_base_path() {
        let client = WttrClient::new("http://localhost:9000/proxy");
        let url = client.lookup_url("Berlin").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/Berlin?format=j1");
    }
}
