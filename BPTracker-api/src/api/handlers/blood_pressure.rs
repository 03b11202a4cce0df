use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
};
use tracing::{error, info, instrument, warn};

use bp_tracker_domain::services::{ReadingServiceError, ReadingServiceTrait};

use crate::entities::blood_pressure::{
    convert_to_domain_request, convert_to_public_reading, BloodPressureReading,
    CreateBloodPressureRequest, ListReadingsParams, ReadingListResponse,
};
use crate::entities::common::ErrorResponse;

/// Service type for dependency injection
pub type ReadingService = Arc<dyn ReadingServiceTrait>;

/// Map domain errors onto the public error body
fn map_service_error(err: ReadingServiceError) -> ErrorResponse {
    match err {
        ReadingServiceError::Validation(details) => {
            warn!("Invalid blood pressure reading input: {}", details.join("; "));
            ErrorResponse::validation_error("Validation failed", Some(details))
        }
        ReadingServiceError::NotFound(id) => {
            info!("Blood pressure reading not found: {}", id);
            ErrorResponse::not_found("Reading not found")
        }
        ReadingServiceError::Repository(message) => {
            error!("Error accessing blood pressure readings: {}", message);
            ErrorResponse::internal_error()
        }
    }
}

/// List readings, newest first
#[utoipa::path(
    get,
    path = "/readings/",
    params(ListReadingsParams),
    responses(
        (status = 200, description = "Page of readings", body = ReadingListResponse),
        (status = 422, description = "Invalid skip or limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn list_readings(
    State(service): State<ReadingService>,
    params: Result<Query<ListReadingsParams>, QueryRejection>,
) -> Result<Json<ReadingListResponse>, ErrorResponse> {
    let Query(params) = params?;
    let window = params.into_window();

    let readings = service
        .list_readings(window)
        .await
        .map_err(map_service_error)?;

    info!("Returning {} blood pressure readings", readings.len());
    Ok(Json(ReadingListResponse {
        readings: readings.into_iter().map(convert_to_public_reading).collect(),
    }))
}

/// Create a new blood pressure reading
#[utoipa::path(
    post,
    path = "/readings/",
    request_body = CreateBloodPressureRequest,
    responses(
        (status = 201, description = "Blood pressure reading created", body = BloodPressureReading),
        (status = 422, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service, payload))]
pub async fn create_reading(
    State(service): State<ReadingService>,
    payload: Result<Json<CreateBloodPressureRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BloodPressureReading>), ErrorResponse> {
    let Json(request) = payload?;

    let reading = service
        .create_reading(convert_to_domain_request(request))
        .await
        .map_err(map_service_error)?;

    Ok((StatusCode::CREATED, Json(convert_to_public_reading(reading))))
}

/// Get a single blood pressure reading by ID
#[utoipa::path(
    get,
    path = "/readings/{reading_id}",
    params(
        ("reading_id" = i64, Path, description = "Blood pressure reading ID")
    ),
    responses(
        (status = 200, description = "Blood pressure reading found", body = BloodPressureReading),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse),
        (status = 422, description = "Reading ID is not an integer", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_reading(
    State(service): State<ReadingService>,
    reading_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BloodPressureReading>, ErrorResponse> {
    let Path(reading_id) = reading_id?;

    let reading = service
        .get_reading(reading_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(convert_to_public_reading(reading)))
}

/// Delete a single blood pressure reading
#[utoipa::path(
    delete,
    path = "/readings/{reading_id}",
    params(
        ("reading_id" = i64, Path, description = "Blood pressure reading ID")
    ),
    responses(
        (status = 204, description = "Blood pressure reading deleted"),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse),
        (status = 422, description = "Reading ID is not an integer", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn delete_reading(
    State(service): State<ReadingService>,
    reading_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ErrorResponse> {
    let Path(reading_id) = reading_id?;

    service
        .delete_reading(reading_id)
        .await
        .map_err(map_service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete every blood pressure reading
#[utoipa::path(
    delete,
    path = "/readings/",
    responses(
        (status = 204, description = "All readings deleted"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn delete_all_readings(
    State(service): State<ReadingService>,
) -> Result<StatusCode, ErrorResponse> {
    service
        .delete_all_readings()
        .await
        .map_err(map_service_error)?;

    Ok(StatusCode::NO_CONTENT)
}
