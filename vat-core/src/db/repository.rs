use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewVehicleRecord, VehicleRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Passive store for vehicle records. Tax figures are stored as given;
/// the store never recomputes them.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create_vehicle(
        &self,
        vehicle: NewVehicleRecord,
    ) -> Result<VehicleRecord, RepositoryError>;

    async fn get_vehicle(
        &self,
        id: i64,
    ) -> Result<VehicleRecord, RepositoryError>;

    /// Overwrites every editable field of the record with `vehicle.id`.
    async fn update_vehicle(
        &self,
        vehicle: &VehicleRecord,
    ) -> Result<(), RepositoryError>;

    async fn delete_vehicle(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// All records, oldest first.
    async fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, RepositoryError>;
}
