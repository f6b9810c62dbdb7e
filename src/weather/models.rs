use serde::Deserialize;

// ---------------------------------------------------------------------------
// wttr.in `?format=j1` response
//
// Only the parts used for normalization are modelled. Every numeric value in
// this format arrives as a JSON string, e.g. `"temp_C": "14"`. Text values are
// wrapped in single-element arrays of `{ "value": "..." }` objects.
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct WttrResponse {
    #[serde(default)]
    pub current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    pub nearest_area: Vec<NearestArea>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentCondition {
    #[serde(rename = "temp_C")]
    pub temp_c: Option<String>,
    #[serde(rename = "FeelsLikeC")]
    pub feels_like_c: Option<String>,
    pub humidity: Option<String>,
    /// UTC time of day, e.g. `"09:41 AM"`.
    pub observation_time: Option<String>,
    /// Local date and time, e.g. `"2024-05-01 10:41 AM"`.
    #[serde(rename = "localObsDateTime")]
    pub local_obs_date_time: Option<String>,
    #[serde(rename = "weatherDesc", default)]
    pub weather_desc: Vec<TextValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearestArea {
    #[serde(rename = "areaName", default)]
    pub area_name: Vec<TextValue>,
    #[serde(default)]
    pub country: Vec<TextValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// First non-blank `value` of a wrapped text list.
pub fn first_text(values: &[TextValue]) -> Option<&str> {
    values
        .first()
        .map(|v| v.value.trim())
        .filter(|v| !v.is_empty())
}
