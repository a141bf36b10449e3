use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::input::{parse_amount, parse_tax_rate};

/// Snapshot of the three values that drive regime eligibility and tax.
///
/// A `None` field was left blank or could not be parsed; either way it does
/// not count toward eligibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInputs {
    pub purchase_value: Option<Decimal>,
    pub sale_value: Option<Decimal>,
    pub tax_rate_percent: Option<Decimal>,
}

impl TransactionInputs {
    /// Builds inputs from raw form text. Malformed numbers become `None`.
    pub fn from_text(
        purchase_value: &str,
        sale_value: &str,
        tax_rate: &str,
    ) -> Self {
        Self {
            purchase_value: parse_amount(purchase_value),
            sale_value: parse_amount(sale_value),
            tax_rate_percent: parse_tax_rate(tax_rate),
        }
    }

    /// Sale value minus purchase value, when both are present.
    pub fn margin(&self) -> Option<Decimal> {
        match (self.sale_value, self.purchase_value) {
            (Some(sale), Some(purchase)) => Some(sale - purchase),
            _ => None,
        }
    }
}
