use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Taxable base and tax due for a transaction under its selected regime,
/// both rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
}
