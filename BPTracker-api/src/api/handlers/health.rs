use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use bp_tracker_domain::health::{ComponentStatus as DomainComponentStatus, HealthServiceTrait};

/// Service type for dependency injection
pub type HealthService = Arc<dyn HealthServiceTrait + Send + Sync>;

/// Liveness response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Always "BPTracker API is running"
    pub status: String,
}

/// Health check response model
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" while the process is serving requests
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Database connectivity
    pub database: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// "ok" or "error"
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Set once; later calls keep the first value
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting
pub fn initialize_server_start_time() {
    SERVER_START_TIME.get_or_init(unix_now);
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API is running", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "BPTracker API is running".to_string(),
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is serving; see database for connectivity", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(Extension(health_service): Extension<HealthService>) -> Json<HealthResponse> {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;
    let database = match system_health.components.get("database") {
        Some(component) => ComponentHealthStatus {
            status: map_component_status(&component.status),
            message: component.details.clone(),
        },
        None => ComponentHealthStatus {
            status: "error".to_string(),
            message: Some("Database status unavailable".to_string()),
        },
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        database,
    })
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bp_tracker_domain::health::{HealthComponent, SystemHealth, SystemStatus};

    #[derive(Debug)]
    struct FailingHealthService;

    #[async_trait]
    impl HealthServiceTrait for FailingHealthService {
        async fn get_system_health(&self) -> SystemHealth {
            SystemHealth {
                status: SystemStatus::Degraded,
                components: vec![(
                    "database".to_string(),
                    HealthComponent {
                        status: DomainComponentStatus::Unhealthy,
                        details: Some("connection refused".to_string()),
                    },
                )]
                .into_iter()
                .collect(),
            }
        }

        async fn check_database_status(&self) -> Result<String, String> {
            Err("connection refused".to_string())
        }
    }

    #[tokio::test]
    async fn test_health_stays_healthy_when_database_fails() {
        initialize_server_start_time();

        let service: HealthService = Arc::new(FailingHealthService);
        let Json(response) = health_check(Extension(service)).await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.database.status, "error");
        assert_eq!(response.database.message.as_deref(), Some("connection refused"));
        assert!(response.uptime.is_some());
    }

    #[test]
    fn test_start_time_is_recorded_once() {
        initialize_server_start_time();
        let first = SERVER_START_TIME.get().copied();

        initialize_server_start_time();
        assert!(first.is_some());
        assert_eq!(SERVER_START_TIME.get().copied(), first);
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let Json(response) = root().await;
        assert_eq!(response.status, "BPTracker API is running");
    }
}
