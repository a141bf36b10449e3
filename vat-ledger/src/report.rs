//! Plain-text rendering of evaluations and stored records.

use std::fmt::Write;

use vat_core::input::{format_form_date, format_optional_amount};
use vat_core::{FiscalRegime, RegimeUpdate, TaxOutcome, VehicleRecord};

const LABEL_WIDTH: usize = 18;

fn line(
    out: &mut String,
    label: &str,
    value: &str,
) {
    let _ = writeln!(out, "{label:<LABEL_WIDTH$}{value}");
}

fn availability(available: bool) -> &'static str {
    if available { "available" } else { "not available" }
}

/// Eligibility, selection and tax figures of one evaluation.
pub fn render_update(update: &RegimeUpdate) -> String {
    let mut out = String::new();
    for regime in FiscalRegime::ALL {
        line(&mut out, regime.as_str(), availability(update.eligibility.allows(regime)));
    }
    line(
        &mut out,
        "Selected",
        update.selected.map(|regime| regime.as_str()).unwrap_or("none"),
    );

    match &update.outcome {
        TaxOutcome::Computed(result) => {
            line(&mut out, "Taxable base", &format_optional_amount(Some(result.taxable_base)));
            line(&mut out, "Tax", &format_optional_amount(Some(result.tax_amount)));
        }
        TaxOutcome::Cleared => line(&mut out, "Tax", "-"),
        TaxOutcome::Failed(error) => line(&mut out, "Tax", &format!("error: {error}")),
    }
    out
}

/// Every field of one record.
pub fn render_record(record: &VehicleRecord) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let date = |value: Option<chrono::NaiveDate>| value.map(format_form_date).unwrap_or_default();

    let mut out = String::new();
    line(&mut out, "Id", &record.id.to_string());
    line(&mut out, "Plate", &record.plate);
    line(&mut out, "Brand", &record.brand);
    line(&mut out, "Chassis number", &text(&record.chassis_number));
    line(&mut out, "ISV", &format_optional_amount(record.isv));
    line(&mut out, "Accounting entry", &text(&record.accounting_entry));
    line(&mut out, "Purchase date", &date(record.purchase_date));
    line(&mut out, "Purchase document", &text(&record.purchase_document));
    line(&mut out, "Document type", record.document_type.as_str());
    line(&mut out, "Purchase value", &format_optional_amount(record.purchase_value));
    line(&mut out, "Sale date", &date(record.sale_date));
    line(&mut out, "Sale document", &text(&record.sale_document));
    line(&mut out, "Sale value", &format_optional_amount(record.sale_value));
    line(
        &mut out,
        "Tax rate",
        &record
            .tax_rate_percent
            .map(|rate| format!("{}%", rate.normalize()))
            .unwrap_or_else(|| "N/A".to_string()),
    );
    line(
        &mut out,
        "Regime",
        record.regime.map(|regime| regime.as_str()).unwrap_or(""),
    );
    line(
        &mut out,
        "Taxable base",
        &format_optional_amount(record.tax.map(|tax| tax.taxable_base)),
    );
    line(
        &mut out,
        "Tax",
        &format_optional_amount(record.tax.map(|tax| tax.tax_amount)),
    );
    out
}

const TABLE_HEADERS: [&str; 7] = [
    "Id",
    "Plate",
    "Brand",
    "Purchase value",
    "Sale document",
    "Sale value",
    "Tax",
];

/// Columns holding amounts, right-aligned.
const NUMERIC_COLUMNS: [bool; 7] = [true, false, false, true, false, true, true];

/// Summary table of records, one row each.
pub fn render_table(records: &[VehicleRecord]) -> String {
    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|record| {
            [
                record.id.to_string(),
                record.plate.clone(),
                record.brand.clone(),
                format_optional_amount(record.purchase_value),
                record.sale_document.clone().unwrap_or_default(),
                format_optional_amount(record.sale_value),
                format_optional_amount(record.tax.map(|tax| tax.tax_amount)),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &TABLE_HEADERS.map(str::to_string), &widths);
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(
    out: &mut String,
    cells: &[String; 7],
    widths: &[usize; 7],
) {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(NUMERIC_COLUMNS)
        .map(|((cell, &width), numeric)| {
            if numeric {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", rendered.join("  ").trim_end());
}
