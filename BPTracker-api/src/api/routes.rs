use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;
use utoipa::OpenApi;

use bp_tracker_data::database::DatabasePool;
use bp_tracker_domain::health::HealthService as DomainHealthService;
use bp_tracker_domain::services::create_reading_service;

use crate::api::handlers::{blood_pressure, health};
use crate::openapi::ApiDoc;

/// Create the application router over an open database pool
pub fn create_app(pool: DatabasePool) -> Router {
    debug!("Creating application router");

    let reading_service: blood_pressure::ReadingService =
        Arc::new(create_reading_service(pool.clone()));
    let health_service: health::HealthService = Arc::new(DomainHealthService::new(pool));

    // "/readings" and "/readings/" are the same collection
    let reading_routes = Router::new()
        .route(
            "/readings",
            get(blood_pressure::list_readings)
                .post(blood_pressure::create_reading)
                .delete(blood_pressure::delete_all_readings),
        )
        .route(
            "/readings/",
            get(blood_pressure::list_readings)
                .post(blood_pressure::create_reading)
                .delete(blood_pressure::delete_all_readings),
        )
        .route(
            "/readings/:reading_id",
            get(blood_pressure::get_reading).delete(blood_pressure::delete_reading),
        )
        .with_state(reading_service);

    debug!("Reading routes configured");

    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(health_service));

    debug!("Public routes configured");

    health::initialize_server_start_time();

    Router::new()
        .merge(public_routes)
        .merge(reading_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

/// Serve the generated OpenAPI document
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
