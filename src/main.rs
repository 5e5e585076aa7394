// src/main.rs
mod extractors;
mod pipeline;
mod storage;
mod utils;
mod workbook;

use std::path::PathBuf;

use clap::Parser;
use storage::{PostgresSink, StorageManager};
use utils::AppError;
use workbook::{LayoutConfig, Workbook};

/// Command Line Interface for the OPEC MOMR appendix extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the MOMR appendix workbook (.xlsx)
    #[arg(short, long, required_unless_present = "check_db")]
    workbook: Option<PathBuf>,

    /// Output directory for the CSV export and run metadata
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Destination table name (CSV file stem and PostgreSQL table)
    #[arg(short, long, default_value = "opec_data")]
    table: String,

    /// PostgreSQL connection URL; without it only the CSV export is written
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// JSON file overriding markers, sheet windows and the heading/total layout
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Number of parsed records to log as a preview
    #[arg(long, default_value_t = 50)]
    preview: usize,

    /// Only check the database connection and exit
    #[arg(long)]
    check_db: bool,

    /// Debug logging for block boundaries and per-sheet counts
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::debug!("Starting: workbook {:?}, table {}, output {}", args.workbook, args.table, args.output_dir.display());

    // 2. Connection check only
    if args.check_db {
        let url = args.database_url.as_deref().ok_or_else(|| {
            AppError::Config("--check-db needs --database-url or DATABASE_URL".to_string())
        })?;
        let sink = PostgresSink::connect(url).await?;
        let version = sink.server_version().await?;
        tracing::info!("PostgreSQL version: {}", version);
        return Ok(());
    }

    // 3. Layout configuration
    let config = match &args.layout {
        Some(path) => LayoutConfig::from_file(path)?,
        None => LayoutConfig::default(),
    };

    // 4. Parse every sheet
    let workbook_path = args
        .workbook
        .clone()
        .ok_or_else(|| AppError::Config("--workbook is required".to_string()))?;
    let mut workbook = Workbook::open(&workbook_path)?;
    let output = pipeline::run(&config, &mut workbook)?;
    pipeline::log_preview(&output.records, args.preview);

    if output.records.is_empty() {
        tracing::warn!("No records parsed from {}", workbook.path().display());
    }

    // 5. Write the CSV export and metadata
    let storage = StorageManager::new(&args.output_dir)?;
    storage.save_records(&args.table, &output.records)?;
    storage.save_run_metadata(&args.table, workbook.path(), &output.sheets, output.records.len())?;

    // 6. Replace the database table
    match &args.database_url {
        Some(url) => {
            let sink = PostgresSink::connect(url).await?;
            let rows = sink.replace_table(&args.table, &output.records).await?;
            tracing::info!("Loaded {} rows into \"{}\"", rows, args.table);
        }
        None => tracing::info!("No database URL given, skipping PostgreSQL load"),
    }

    tracing::info!("Processing finished: {} records from {} sheets", output.records.len(), output.sheets.len());
    Ok(())
}
