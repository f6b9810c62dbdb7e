pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{db::ReadingStore, weather::WeatherProvider};
use handlers::ApiDoc;

/// Handles shared by every request. Constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub weather: Arc<dyn WeatherProvider>,
    /// Static file `/` redirects to.
    pub index_page: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            store,
            weather,
            index_page: Arc::from("client.html"),
        }
    }

    pub fn with_index_page(mut self, index_page: &str) -> Self {
        self.index_page = Arc::from(index_page);
        self
    }
}

/// Build the full application: JSON API, OpenAPI document, `/` redirect and
/// the static client served from `static_dir` for every other path.
pub fn router(state: AppState, static_dir: &str) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/readings",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route(
            "/readings/{id}",
            get(handlers::get_reading)
                .put(handlers::update_reading)
                .delete(handlers::delete_reading),
        )
        .route("/readings-latest", get(handlers::latest_reading))
        .route("/weather", get(handlers::get_weather))
        .route("/", get(handlers::index))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
