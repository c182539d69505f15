use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use powerplatform_connection_bootstrap::LogLevel;
use powerplatform_connection_bootstrap::app;
use powerplatform_connection_bootstrap::cli::Cli;
use powerplatform_connection_bootstrap::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level: LogLevel = cli.log_level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match Config::resolve(cli) {
        Ok(config) => app::run(&config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(summary) => {
            log::info!(
                "Dataverse connection {}, SharePoint connection {}",
                summary.dataverse_connection_id,
                summary.sharepoint_connection_id
            );
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
