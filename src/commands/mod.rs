pub mod migrate;
pub mod report;

use crate::{Config, Server};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: migrate::MigrateAction,
    },
    /// Export the all-ventures report to a CSV file
    Report(report::ReportArgs),
}

pub async fn handle_command(
    command: Commands,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => {
            let server = Server::new(config).await?;
            server.run().await?;
            Ok(())
        }
        Commands::Migrate { action } => migrate::handle_migrate_command(action, &config).await,
        Commands::Report(args) => report::handle_report_command(args, &config).await,
    }
}
