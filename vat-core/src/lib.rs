pub mod calculations;
pub mod db;
pub mod input;
pub mod models;

pub use calculations::{
    CalculationError, RegimeConfig, RegimeSelector, RegimeUpdate, SelectionError, SelectionState,
    TaxOutcome, TaxRegimeCalculator,
};
pub use db::repository::{RepositoryError, VehicleRepository};
pub use models::*;
