use anyhow::Context;
use clap::Parser;
use tracing::debug;

use vat_ledger::app;
use vat_ledger::cli::Cli;
use vat_ledger::logging;
use vat_ledger::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::discover(cli.config.as_deref())
        .context("failed to load settings")?
        .with_database_overrides(cli.backend, cli.db);
    debug!(?settings, "effective settings");

    let output = app::run(cli.command, &settings).await?;
    print!("{output}");

    Ok(())
}
