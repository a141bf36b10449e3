use anyhow::{Context, Result};
use tracing::{debug, info};
use vat_core::db::RepositoryRegistry;
use vat_core::{
    FiscalRegime, RegimeConfig, RegimeSelector, RegimeUpdate, SelectionError, TransactionInputs,
    VehicleRecord, VehicleRepository,
};
use vat_db_sqlite::SqliteRepositoryFactory;

use crate::cli::{Command, EvaluateArgs};
use crate::form::VehicleForm;
use crate::report;
use crate::settings::Settings;

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(settings: &Settings) -> Result<Box<dyn VehicleRepository>> {
    let db_config = settings.database.db_config();
    debug!("connecting to {} backend", db_config.backend);

    build_registry()
        .create(&db_config)
        .await
        .with_context(|| format!("failed to open database '{}'", db_config.connection_string))
}

/// Evaluates raw field text without touching storage.
pub fn evaluate(
    config: RegimeConfig,
    inputs: TransactionInputs,
    regime: Option<FiscalRegime>,
) -> Result<RegimeUpdate, SelectionError> {
    let mut selector = RegimeSelector::new(config);
    let update = selector.on_inputs_changed(inputs);
    match regime {
        Some(regime) => selector.select(regime),
        None => Ok(update),
    }
}

pub async fn add_vehicle(
    repo: &dyn VehicleRepository,
    form: &VehicleForm,
    config: RegimeConfig,
) -> Result<VehicleRecord> {
    let new_vehicle = form.validate(config).context("invalid vehicle record")?;
    let created = repo
        .create_vehicle(new_vehicle)
        .await
        .context("failed to store vehicle record")?;
    info!(id = created.id, plate = %created.plate, "vehicle added");
    Ok(created)
}

/// Loads record `id`, lets `edit` change its form, and stores the result.
///
/// `edit` returns whether it set the regime itself. A regime it leaves alone
/// is dropped when the edited values no longer allow it; one it sets must be
/// eligible.
pub async fn update_vehicle<F>(
    repo: &dyn VehicleRepository,
    id: i64,
    config: RegimeConfig,
    edit: F,
) -> Result<VehicleRecord>
where
    F: FnOnce(&mut VehicleForm) -> bool,
{
    let mut record = load_vehicle(repo, id).await?;

    let mut form = VehicleForm::from_record(&record, config);
    let carried = form.regime;
    let regime_requested = edit(&mut form);
    if !regime_requested {
        let mut selector = RegimeSelector::restore(config, record.inputs(), carried);
        form.regime = selector.on_inputs_changed(form.inputs()).selected;
    }
    let changes = form.validate(config).context("invalid vehicle record")?;

    record.apply(changes);
    repo.update_vehicle(&record)
        .await
        .with_context(|| format!("failed to update vehicle {id}"))?;
    info!(id, "vehicle updated");

    load_vehicle(repo, id).await
}

pub async fn load_vehicle(
    repo: &dyn VehicleRepository,
    id: i64,
) -> Result<VehicleRecord> {
    repo.get_vehicle(id)
        .await
        .with_context(|| format!("failed to load vehicle {id}"))
}

pub async fn delete_vehicle(
    repo: &dyn VehicleRepository,
    id: i64,
) -> Result<()> {
    repo.delete_vehicle(id)
        .await
        .with_context(|| format!("failed to delete vehicle {id}"))?;
    info!(id, "vehicle deleted");
    Ok(())
}

/// Runs one command against an already open repository and returns the
/// text to print.
pub async fn execute(
    command: Command,
    repo: &dyn VehicleRepository,
    config: RegimeConfig,
) -> Result<String> {
    match command {
        Command::Evaluate(args) => run_evaluate(&args, config),
        Command::Add(fields) => {
            let mut form = VehicleForm::default();
            fields.apply_to(&mut form);
            let created = add_vehicle(repo, &form, config).await?;
            Ok(report::render_record(&created))
        }
        Command::Update {
            id,
            fields,
            clear_regime,
        } => {
            let updated = update_vehicle(repo, id, config, |form| {
                let regime_requested = fields.apply_to(form);
                if clear_regime {
                    form.regime = None;
                }
                regime_requested || clear_regime
            })
            .await?;
            Ok(report::render_record(&updated))
        }
        Command::Show { id } => Ok(report::render_record(&load_vehicle(repo, id).await?)),
        Command::List => {
            let vehicles = repo
                .list_vehicles()
                .await
                .context("failed to list vehicles")?;
            Ok(report::render_table(&vehicles))
        }
        Command::Delete { id } => {
            delete_vehicle(repo, id).await?;
            Ok(format!("Deleted vehicle {id}\n"))
        }
    }
}

fn run_evaluate(
    args: &EvaluateArgs,
    config: RegimeConfig,
) -> Result<String> {
    let inputs = TransactionInputs::from_text(&args.purchase, &args.sale, &args.rate);
    let update = evaluate(config, inputs, args.regime)?;
    Ok(report::render_update(&update))
}

/// Runs one command, opening storage only when the command needs it.
pub async fn run(
    command: Command,
    settings: &Settings,
) -> Result<String> {
    if let Command::Evaluate(args) = &command {
        return run_evaluate(args, settings.calculator);
    }

    let repo = open_repository(settings).await?;
    execute(command, &*repo, settings.calculator).await
}
