use crate::Config;
use crate::database::{DatabaseManager, DatabaseManagerImpl, migration::Migrator};
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Run all pending migrations
    Up,
    /// Rollback applied migrations
    Down {
        #[arg(short, long, help = "Number of migrations to rollback", default_value = "1")]
        steps: u32,
    },
    /// Show migration status
    Status,
}

pub async fn handle_migrate_command(
    action: MigrateAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_manager = DatabaseManagerImpl::new_from_config(config).await?;
    let connection = db_manager.connection();

    match action {
        MigrateAction::Up => {
            info!("Running pending migrations...");
            Migrator::up(connection, None).await?;
            info!("All migrations completed successfully");
        }
        MigrateAction::Down { steps } => {
            info!("Rolling back {} migration(s)...", steps);
            Migrator::down(connection, Some(steps)).await?;
            info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            let pending = Migrator::get_pending_migrations(connection).await?;
            let applied = Migrator::get_applied_migrations(connection).await?;
            for migration in &applied {
                println!("applied  {}", migration.name());
            }
            for migration in &pending {
                println!("pending  {}", migration.name());
            }
            info!(
                applied = applied.len(),
                pending = pending.len(),
                "Migration status"
            );
        }
    }

    Ok(())
}
