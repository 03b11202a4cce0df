use utoipa::OpenApi;

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::root,
        crate::api::handlers::health::health_check,

        // Reading endpoints
        crate::api::handlers::blood_pressure::list_readings,
        crate::api::handlers::blood_pressure::create_reading,
        crate::api::handlers::blood_pressure::get_reading,
        crate::api::handlers::blood_pressure::delete_reading,
        crate::api::handlers::blood_pressure::delete_all_readings,
    ),
    components(
        schemas(
            crate::entities::blood_pressure::BloodPressureReading,
            crate::entities::blood_pressure::CreateBloodPressureRequest,
            crate::entities::blood_pressure::ReadingListResponse,
            crate::entities::common::ErrorResponse,
            crate::api::handlers::health::StatusResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Liveness and health endpoints"),
        (name = "readings", description = "Blood pressure reading endpoints")
    ),
    info(
        title = "BPTracker API",
        version = "0.1.0",
        description = "API for recording blood pressure and heart rate readings"
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
