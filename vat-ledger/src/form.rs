use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;
use vat_core::input::{
    InvalidDate, NO_RATE, format_form_date, format_optional_amount, parse_amount, parse_form_date,
};
use vat_core::{
    CalculationError, DocumentType, FiscalRegime, NewVehicleRecord, RegimeConfig, RegimeSelector,
    SelectionError, TaxOutcome, TaxRate, TransactionInputs, VehicleRecord,
};

/// One problem found while validating a [`VehicleForm`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field}: {source}")]
    Date {
        field: &'static str,
        #[source]
        source: InvalidDate,
    },

    #[error(transparent)]
    Regime(#[from] SelectionError),

    #[error("tax could not be computed: {0}")]
    Calculation(#[from] CalculationError),
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FormError>);

impl std::error::Error for FormErrors {}

impl fmt::Display for FormErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Raw text of a vehicle record as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleForm {
    pub plate: String,
    pub brand: String,
    pub chassis_number: String,
    pub isv: String,
    pub accounting_entry: String,

    pub purchase_date: String,
    pub purchase_document: String,
    pub document_type: DocumentType,
    pub purchase_value: String,

    pub sale_date: String,
    pub sale_document: String,
    pub sale_value: String,

    /// `"N/A"`, or one of the offered percentages.
    pub tax_rate: String,
    pub regime: Option<FiscalRegime>,
}

impl Default for VehicleForm {
    fn default() -> Self {
        Self {
            plate: String::new(),
            brand: String::new(),
            chassis_number: String::new(),
            isv: String::new(),
            accounting_entry: String::new(),
            purchase_date: String::new(),
            purchase_document: String::new(),
            document_type: DocumentType::default(),
            purchase_value: String::new(),
            sale_date: String::new(),
            sale_document: String::new(),
            sale_value: String::new(),
            tax_rate: NO_RATE.to_string(),
            regime: None,
        }
    }
}

impl VehicleForm {
    /// Fills a form from a stored record for editing.
    ///
    /// The saved regime is kept only if the stored values still allow it.
    pub fn from_record(
        record: &VehicleRecord,
        config: RegimeConfig,
    ) -> Self {
        let selector = RegimeSelector::restore(config, record.inputs(), record.regime);

        Self {
            plate: record.plate.clone(),
            brand: record.brand.clone(),
            chassis_number: record.chassis_number.clone().unwrap_or_default(),
            isv: format_optional_amount(record.isv),
            accounting_entry: record.accounting_entry.clone().unwrap_or_default(),
            purchase_date: record.purchase_date.map(format_form_date).unwrap_or_default(),
            purchase_document: record.purchase_document.clone().unwrap_or_default(),
            document_type: record.document_type,
            purchase_value: format_optional_amount(record.purchase_value),
            sale_date: record.sale_date.map(format_form_date).unwrap_or_default(),
            sale_document: record.sale_document.clone().unwrap_or_default(),
            sale_value: format_optional_amount(record.sale_value),
            tax_rate: record
                .tax_rate_percent
                .map(format_rate)
                .unwrap_or_else(|| NO_RATE.to_string()),
            regime: selector.selected(),
        }
    }

    pub fn inputs(&self) -> TransactionInputs {
        TransactionInputs::from_text(&self.purchase_value, &self.sale_value, &self.tax_rate)
    }

    /// Checks the form and builds the record to store.
    ///
    /// The stored tax figures are always recomputed for the selected regime.
    pub fn validate(
        &self,
        config: RegimeConfig,
    ) -> Result<NewVehicleRecord, FormErrors> {
        let mut errors = Vec::new();

        let plate = required("Plate", &self.plate, &mut errors);
        let brand = required("Brand", &self.brand, &mut errors);
        let purchase_date = date("Purchase date", &self.purchase_date, &mut errors);
        let sale_date = date("Sale date", &self.sale_date, &mut errors);

        let inputs = self.inputs();
        let mut selector = RegimeSelector::new(config);
        let mut update = selector.on_inputs_changed(inputs);
        if let Some(regime) = self.regime {
            match selector.select(regime) {
                Ok(selected) => update = selected,
                Err(e) => errors.push(e.into()),
            }
        }

        let tax = match update.outcome {
            TaxOutcome::Computed(result) => Some(result),
            TaxOutcome::Cleared => None,
            TaxOutcome::Failed(e) => {
                errors.push(e.into());
                None
            }
        };

        if !errors.is_empty() {
            debug!(count = errors.len(), "vehicle form rejected");
            return Err(FormErrors(errors));
        }

        Ok(NewVehicleRecord {
            plate: plate.unwrap_or_default(),
            brand: brand.unwrap_or_default(),
            chassis_number: optional_text(&self.chassis_number),
            isv: parse_amount(&self.isv),
            accounting_entry: optional_text(&self.accounting_entry),
            purchase_date: purchase_date.flatten(),
            purchase_document: optional_text(&self.purchase_document),
            document_type: self.document_type,
            purchase_value: inputs.purchase_value,
            sale_date: sale_date.flatten(),
            sale_document: optional_text(&self.sale_document),
            sale_value: inputs.sale_value,
            tax_rate_percent: inputs.tax_rate_percent,
            regime: update.selected,
            tax,
        })
    }
}

fn required(
    field: &'static str,
    value: &str,
    errors: &mut Vec<FormError>,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FormError::Required(field));
        return None;
    }
    Some(trimmed.to_string())
}

fn date(
    field: &'static str,
    value: &str,
    errors: &mut Vec<FormError>,
) -> Option<Option<chrono::NaiveDate>> {
    match parse_form_date(value) {
        Ok(date) => Some(date),
        Err(source) => {
            errors.push(FormError::Date { field, source });
            None
        }
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `23` rather than `23.00`.
/// Offered rates use their choice label; anything else keeps its digits.
fn format_rate(rate: Decimal) -> String {
    match TaxRate::from_percent(rate) {
        Some(offered) => offered.as_str().to_string(),
        None => rate.normalize().to_string(),
    }
}
