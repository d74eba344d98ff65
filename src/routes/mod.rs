pub mod health;
pub mod readings;

use axum::{
    routing::get,
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::sensor::SensorType;

/// Validate the path-supplied table selector against the closed set.
///
/// An unknown selector is a 404, matching the original service, even
/// though a 400 would be conventional. Runs before any store access.
pub fn resolve_sensor_type(raw: &str) -> AppResult<SensorType> {
    raw.parse()
        .map_err(|()| AppError::NotFound("Invalid sensor type".to_string()))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        readings::root,
        readings::get_count,
        readings::list_readings,
        readings::create_reading,
        readings::get_reading,
        readings::update_reading,
        readings::delete_reading,
    ),
    components(
        schemas(
            crate::sensor::Reading,
            crate::sensor::ReadingPayload,
            readings::CountResponse,
            readings::DeleteResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "root", description = "Service greeting"),
        (name = "readings", description = "Sensor reading CRUD"),
    ),
    info(
        title = "Sensor Readings API",
        description = "CRUD API over temperature, humidity, and light sensor readings",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/{sensor_type}",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route("/{sensor_type}/count", get(readings::get_count))
        .route(
            "/{sensor_type}/{id}",
            get(readings::get_reading)
                .put(readings::update_reading)
                .delete(readings::delete_reading),
        )
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .route("/", get(readings::root))
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
