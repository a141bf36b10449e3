use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use vat_core::input::NO_RATE;
use vat_core::{DocumentType, FiscalRegime};

use crate::form::VehicleForm;

/// Vehicle purchase/sale ledger with VAT under the normal and margin
/// regimes.
///
/// Settings are read from `--config`, or `vat-ledger.toml` in the working
/// directory when present. `--backend` and `--db` override the file.
#[derive(Debug, Parser)]
#[command(name = "vat-ledger", version, about, long_about = None)]
pub struct Cli {
    /// Database backend to use.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `ledger.db`), a `sqlite:` URL or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which regimes apply and the resulting tax, without storing anything.
    Evaluate(EvaluateArgs),

    /// Store a new vehicle record.
    Add(VehicleFields),

    /// Change fields of a stored record. Omitted fields keep their value.
    Update {
        id: i64,

        #[command(flatten)]
        fields: VehicleFields,

        /// Remove the selected regime and its tax figures.
        #[arg(long, conflicts_with = "regime")]
        clear_regime: bool,
    },

    /// Print one record.
    Show { id: i64 },

    /// Print every record as a table.
    List,

    /// Delete a record.
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Purchase value (`1 234,56` and `1234.56` are both accepted).
    #[arg(long, default_value = "")]
    pub purchase: String,

    /// Sale value.
    #[arg(long, default_value = "")]
    pub sale: String,

    /// Tax rate in percent: 6, 13, 23 or N/A.
    #[arg(long, default_value = NO_RATE)]
    pub rate: String,

    /// Regime to compute the tax for.
    #[arg(long, value_parser = parse_regime)]
    pub regime: Option<FiscalRegime>,
}

/// Record fields accepted by `add` and `update`.
#[derive(Debug, Default, Args)]
pub struct VehicleFields {
    /// Licence plate (required).
    #[arg(long)]
    pub plate: Option<String>,

    /// Brand (required).
    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub chassis: Option<String>,

    /// Registration tax (ISV) paid.
    #[arg(long)]
    pub isv: Option<String>,

    /// Accounting entry number.
    #[arg(long)]
    pub entry: Option<String>,

    /// Purchase date, DD-MM-YYYY.
    #[arg(long)]
    pub purchase_date: Option<String>,

    #[arg(long)]
    pub purchase_doc: Option<String>,

    /// invoice, invoice-receipt, simplified-invoice or declaration.
    #[arg(long, value_parser = parse_document_type)]
    pub doc_type: Option<DocumentType>,

    #[arg(long)]
    pub purchase: Option<String>,

    /// Sale date, DD-MM-YYYY.
    #[arg(long)]
    pub sale_date: Option<String>,

    #[arg(long)]
    pub sale_doc: Option<String>,

    #[arg(long)]
    pub sale: Option<String>,

    /// Tax rate in percent: 6, 13, 23 or N/A.
    #[arg(long)]
    pub rate: Option<String>,

    /// normal or margin.
    #[arg(long, value_parser = parse_regime)]
    pub regime: Option<FiscalRegime>,
}

impl VehicleFields {
    /// Copies every given field into `form`. Returns whether a regime was
    /// requested.
    pub fn apply_to(
        &self,
        form: &mut VehicleForm,
    ) -> bool {
        let text_fields = [
            (&self.plate, &mut form.plate),
            (&self.brand, &mut form.brand),
            (&self.chassis, &mut form.chassis_number),
            (&self.isv, &mut form.isv),
            (&self.entry, &mut form.accounting_entry),
            (&self.purchase_date, &mut form.purchase_date),
            (&self.purchase_doc, &mut form.purchase_document),
            (&self.purchase, &mut form.purchase_value),
            (&self.sale_date, &mut form.sale_date),
            (&self.sale_doc, &mut form.sale_document),
            (&self.sale, &mut form.sale_value),
            (&self.rate, &mut form.tax_rate),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }

        if let Some(document_type) = self.doc_type {
            form.document_type = document_type;
        }
        if let Some(regime) = self.regime {
            form.regime = Some(regime);
        }
        self.regime.is_some()
    }
}

fn parse_regime(s: &str) -> Result<FiscalRegime, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "normal" | "regime normal" => Ok(FiscalRegime::Normal),
        "margin" | "margem" => Ok(FiscalRegime::Margin),
        _ => Err(format!("unknown regime '{s}', expected normal or margin")),
    }
}

fn parse_document_type(s: &str) -> Result<DocumentType, String> {
    if let Some(document_type) = DocumentType::parse(s) {
        return Ok(document_type);
    }
    match s.trim().to_ascii_lowercase().as_str() {
        "invoice" => Ok(DocumentType::Invoice),
        "invoice-receipt" => Ok(DocumentType::InvoiceReceipt),
        "simplified-invoice" => Ok(DocumentType::SimplifiedInvoice),
        "declaration" => Ok(DocumentType::Declaration),
        _ => Err(format!("unknown document type '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vat-ledger", "list", "--db", "ledger.db", "-vv"]).unwrap();

        assert_eq!(cli.db.as_deref(), Some("ledger.db"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parses_evaluate_defaults() {
        let cli = Cli::try_parse_from(["vat-ledger", "evaluate", "--sale", "123"]).unwrap();

        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.sale, "123");
        assert_eq!(args.purchase, "");
        assert_eq!(args.rate, NO_RATE);
        assert_eq!(args.regime, None);
    }

    #[test]
    fn regime_accepts_names_and_tags() {
        assert_eq!(parse_regime("margin"), Ok(FiscalRegime::Margin));
        assert_eq!(parse_regime("Margem"), Ok(FiscalRegime::Margin));
        assert_eq!(parse_regime("Regime Normal"), Ok(FiscalRegime::Normal));
        assert!(parse_regime("other").is_err());
    }

    #[test]
    fn document_type_accepts_names_and_labels() {
        assert_eq!(
            parse_document_type("invoice-receipt"),
            Ok(DocumentType::InvoiceReceipt)
        );
        assert_eq!(parse_document_type("Declaração"), Ok(DocumentType::Declaration));
        assert!(parse_document_type("receipt").is_err());
    }

    #[test]
    fn update_rejects_regime_with_clear_regime() {
        let result = Cli::try_parse_from([
            "vat-ledger",
            "update",
            "3",
            "--regime",
            "normal",
            "--clear-regime",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn apply_to_only_touches_given_fields() {
        let mut form = VehicleForm {
            plate: "AA-00-BB".to_string(),
            sale_value: "200".to_string(),
            ..VehicleForm::default()
        };
        let fields = VehicleFields {
            sale: Some("250".to_string()),
            regime: Some(FiscalRegime::Normal),
            ..VehicleFields::default()
        };

        let regime_requested = fields.apply_to(&mut form);

        assert!(regime_requested);
        assert_eq!(form.plate, "AA-00-BB");
        assert_eq!(form.sale_value, "250");
        assert_eq!(form.regime, Some(FiscalRegime::Normal));
    }
}
