//! Domain layer health check functionality

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::error;

use bp_tracker_data::database::DatabasePool;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// At least one component is failing; the API keeps serving
    Degraded,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check that the database answers a trivial query
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health service probing the configured database
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(details) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(details),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let status = if db_component.status == ComponentStatus::Healthy {
            SystemStatus::Healthy
        } else {
            SystemStatus::Degraded
        };

        SystemHealth {
            status,
            components: vec![("database".to_string(), db_component)]
                .into_iter()
                .collect(),
        }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        match self.pool.ping().await {
            Ok(()) => Ok(self.pool.describe()),
            Err(e) => {
                error!("Database health check failed: {}", e);
                Err(format!("Database connection error: {}", e))
            }
        }
    }
}
