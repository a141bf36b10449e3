mod document_type;
mod eligibility;
mod fiscal_regime;
mod tax_rate;
mod tax_result;
mod transaction_inputs;
mod vehicle_record;

pub use document_type::DocumentType;
pub use eligibility::RegimeEligibility;
pub use fiscal_regime::FiscalRegime;
pub use tax_rate::TaxRate;
pub use tax_result::TaxResult;
pub use transaction_inputs::TransactionInputs;
pub use vehicle_record::{NewVehicleRecord, VehicleRecord};
