use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use super::{
    dto::{CreateReadingRequest, DeletedResponse, ErrorBody, UpdateReadingRequest, WeatherQuery},
    errors::AppError,
    AppState,
};
use crate::{
    db::{models::Reading, StoreError},
    weather::WeatherReport,
};

/// A path id that is not a well-formed UUID can never match a stored
/// reading, so it is reported the same way as an unknown id.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse::<Uuid>()
        .map_err(|_| AppError::from(StoreError::NotFound))
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// List every reading, newest first.
#[utoipa::path(
    get,
    path = "/readings",
    responses(
        (status = 200, description = "All readings ordered by createdAt DESC", body = Vec<Reading>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn list_readings(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, AppError> {
    let rows = state.store.list_all().await?;
    Ok(Json(rows))
}

/// Fetch a single reading by id.
#[utoipa::path(
    get,
    path = "/readings/{id}",
    params(("id" = String, Path, description = "Reading id")),
    responses(
        (status = 200, description = "The reading", body = Reading),
        (status = 404, description = "Unknown or malformed id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn get_reading(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reading>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_by_id(id).await?))
}

/// Store a new reading. `temperature` must be a JSON number.
#[utoipa::path(
    post,
    path = "/readings",
    request_body = CreateReadingRequest,
    responses(
        (status = 201, description = "Reading created", body = Reading),
        (status = 400, description = "temperature missing or not a number", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    payload: Result<Json<CreateReadingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), AppError> {
    let Json(req) = payload?;
    let new = req.validate()?;

    let reading = state.store.create(new).await?;
    info!(id = %reading.id, temperature = reading.temperature, "Reading created");
    Ok((StatusCode::CREATED, Json(reading)))
}

/// Merge the supplied fields into an existing reading. A request without a
/// JSON body is an empty patch.
#[utoipa::path(
    put,
    path = "/readings/{id}",
    params(("id" = String, Path, description = "Reading id")),
    request_body = UpdateReadingRequest,
    responses(
        (status = 200, description = "Updated reading", body = Reading),
        (status = 400, description = "Invalid field value", body = ErrorBody),
        (status = 404, description = "Unknown or malformed id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn update_reading(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Option<Json<UpdateReadingRequest>>, JsonRejection>,
) -> Result<Json<Reading>, AppError> {
    let id = parse_id(&id)?;
    let req = payload?.map(|Json(req)| req).unwrap_or_default();
    let patch = req.validate()?;

    let reading = state.store.update_by_id(id, patch).await?;
    debug!(id = %reading.id, "Reading updated");
    Ok(Json(reading))
}

/// Delete a reading. Deleting an id twice reports 404 the second time.
#[utoipa::path(
    delete,
    path = "/readings/{id}",
    params(("id" = String, Path, description = "Reading id")),
    responses(
        (status = 200, description = "Reading deleted", body = DeletedResponse),
        (status = 404, description = "Unknown or malformed id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn delete_reading(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_id(&id)?;
    let id = state.store.delete_by_id(id).await?;
    info!(id = %id, "Reading deleted");
    Ok(Json(DeletedResponse { deleted: true, id }))
}

/// The most recently created reading.
#[utoipa::path(
    get,
    path = "/readings-latest",
    responses(
        (status = 200, description = "Latest reading", body = Reading),
        (status = 404, description = "No readings yet", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "readings"
)]
pub async fn latest_reading(State(state): State<AppState>) -> Result<Json<Reading>, AppError> {
    match state.store.get_latest().await {
        Ok(reading) => Ok(Json(reading)),
        Err(StoreError::NotFound) => Err(AppError::NotFound("No readings yet")),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Current conditions for `?location=` from the weather provider.
#[utoipa::path(
    get,
    path = "/weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Normalized current conditions", body = WeatherReport),
        (status = 400, description = "location query parameter missing", body = ErrorBody),
        (status = 500, description = "Provider lookup failed", body = ErrorBody),
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    payload: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherReport>, AppError> {
    let Query(params) = payload?;
    let location = params.location()?;

    let report = state.weather.lookup(location).await.map_err(|e| {
        warn!(location = %location, error = %e, "Weather lookup failed");
        AppError::Internal(e)
    })?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Static client
// ---------------------------------------------------------------------------

/// Redirect `/` to the bundled client page.
pub async fn index(State(state): State<AppState>) -> Response {
    let location = format!("/{}", state.index_page);
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        list_readings,
        get_reading,
        create_reading,
        update_reading,
        delete_reading,
        latest_reading,
        get_weather,
        health
    ),
    components(schemas(
        Reading,
        CreateReadingRequest,
        UpdateReadingRequest,
        DeletedResponse,
        WeatherReport,
        ErrorBody
    )),
    tags(
        (name = "readings", description = "Sensor reading endpoints"),
        (name = "weather",  description = "External weather lookup"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Sensor Readings API",
        version = "0.1.0",
        description = "REST API for stored temperature readings and current weather"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
