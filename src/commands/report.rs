use crate::{
    Config,
    csv_codec::write_records,
    database::{DatabaseManager, DatabaseManagerImpl},
    report::{ReportGenerator, ReportParams},
};
use chrono::NaiveDate;
use clap::Args;
use std::{fs::File, io::BufWriter, path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// First day of the report, YYYY-MM-DD
    #[arg(long)]
    pub start: NaiveDate,
    /// Last day of the report, YYYY-MM-DD
    #[arg(long)]
    pub end: NaiveDate,
    /// Warehouse applied to usage types priced per warehouse
    #[arg(long)]
    pub warehouse: Option<i32>,
    /// Skip inactive ventures
    #[arg(long)]
    pub only_active: bool,
    /// Use forecast prices and costs
    #[arg(long)]
    pub forecast: bool,
    /// Destination CSV file
    #[arg(short, long)]
    pub output: PathBuf,
}

impl From<&ReportArgs> for ReportParams {
    fn from(args: &ReportArgs) -> Self {
        ReportParams {
            warehouse: args.warehouse,
            start: args.start,
            end: args.end,
            show_only_active: args.only_active,
            forecast: args.forecast,
        }
    }
}

pub async fn handle_report_command(
    args: ReportArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = ReportParams::from(&args);
    params.period()?;

    let database = DatabaseManagerImpl::new_from_config(config).await?;
    if config.database.migration_on_startup {
        database.migrate().await?;
    }
    let database: Arc<dyn DatabaseManager> = Arc::new(database);

    let table = ReportGenerator::new(database).run(params).await?;

    let file = File::create(&args.output)?;
    write_records(
        BufWriter::new(file),
        table.text_rows(),
        &config.csv.export_dialect(),
    )?;

    info!(
        rows = table.rows.len(),
        output = %args.output.display(),
        "Venture report written"
    );
    Ok(())
}
