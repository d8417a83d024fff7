use clap::Parser;
use livetest::Settings;
use livetest::cli::{Cli, Commands, commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    livetest::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Check { manifests } => commands::check::run(&manifests, &settings),
        Commands::Serve { manifests } => commands::serve::run(&manifests, &settings).await,
    }
}
