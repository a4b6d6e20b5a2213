mod cli;
mod commands;
mod discover;
mod observability;
mod output;
mod settings;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;
use settings::Settings;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<bool> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    observability::init_tracing(&settings.logging.level);

    match &cli.command {
        Commands::Validate(args) => commands::validate::run(&settings, &args.paths),
        Commands::Apply(args) => commands::apply::run(&settings, &args.paths).await,
        Commands::Remove(args) => commands::remove::run(&settings, &args.name).await,
        Commands::Status => commands::status::run(&settings).await,
    }
}
