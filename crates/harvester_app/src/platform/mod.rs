mod cli;
mod commands;
mod logging;
mod settings;

use clap::Parser;

use cli::Cli;

pub async fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into());
    let settings = settings::load_settings(cli.config.as_deref())?;
    commands::execute(cli.command, settings, &cli.store).await
}
