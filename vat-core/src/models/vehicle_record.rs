use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DocumentType, FiscalRegime, TaxResult, TransactionInputs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: i64,

    // Identification
    pub plate: String,
    pub brand: String,
    pub chassis_number: Option<String>,
    /// Vehicle registration tax (ISV). Recorded, never computed.
    pub isv: Option<Decimal>,
    pub accounting_entry: Option<String>,

    // Purchase
    pub purchase_date: Option<NaiveDate>,
    pub purchase_document: Option<String>,
    pub document_type: DocumentType,
    pub purchase_value: Option<Decimal>,

    // Sale
    pub sale_date: Option<NaiveDate>,
    pub sale_document: Option<String>,
    pub sale_value: Option<Decimal>,

    // Tax
    pub tax_rate_percent: Option<Decimal>,
    pub regime: Option<FiscalRegime>,
    pub tax: Option<TaxResult>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new records (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicleRecord {
    pub plate: String,
    pub brand: String,
    pub chassis_number: Option<String>,
    pub isv: Option<Decimal>,
    pub accounting_entry: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_document: Option<String>,
    pub document_type: DocumentType,
    pub purchase_value: Option<Decimal>,
    pub sale_date: Option<NaiveDate>,
    pub sale_document: Option<String>,
    pub sale_value: Option<Decimal>,
    pub tax_rate_percent: Option<Decimal>,
    pub regime: Option<FiscalRegime>,
    pub tax: Option<TaxResult>,
}

impl VehicleRecord {
    pub fn inputs(&self) -> TransactionInputs {
        TransactionInputs {
            purchase_value: self.purchase_value,
            sale_value: self.sale_value,
            tax_rate_percent: self.tax_rate_percent,
        }
    }

    /// Replaces every editable field with the values from `changes`,
    /// keeping the id and timestamps.
    pub fn apply(
        &mut self,
        changes: NewVehicleRecord,
    ) {
        self.plate = changes.plate;
        self.brand = changes.brand;
        self.chassis_number = changes.chassis_number;
        self.isv = changes.isv;
        self.accounting_entry = changes.accounting_entry;
        self.purchase_date = changes.purchase_date;
        self.purchase_document = changes.purchase_document;
        self.document_type = changes.document_type;
        self.purchase_value = changes.purchase_value;
        self.sale_date = changes.sale_date;
        self.sale_document = changes.sale_document;
        self.sale_value = changes.sale_value;
        self.tax_rate_percent = changes.tax_rate_percent;
        self.regime = changes.regime;
        self.tax = changes.tax;
    }
}

impl NewVehicleRecord {
    pub fn inputs(&self) -> TransactionInputs {
        TransactionInputs {
            purchase_value: self.purchase_value,
            sale_value: self.sale_value,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}
