//! CLI entry point for the check battery.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use polars::prelude::*;
use tablecheck::{
    CheckConfig, CheckRunner, DataFrameBackend, DatasetRef, Partition, TableRef,
    DEFAULT_MOVING_AVERAGE_WINDOW,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistical data-quality check battery for tabular datasets",
    long_about = "Runs six data-quality checks over a CSV dataset and prints a JSON report.\n\n\
                  EXAMPLES:\n  \
                  # Full battery over orders.csv, keyed by order_id\n  \
                  tablecheck -i orders.csv -k order_id\n\n  \
                  # Compound key, update cadence check and a report file\n  \
                  tablecheck -i orders.csv -k order_id,line_no --lud-column updated_on -o report.json\n\n  \
                  # Restrict the run to one partition\n  \
                  tablecheck -i orders.csv -k order_id -p region=EU -p year=2023,2024"
)]
struct Args {
    /// Path to the CSV file to check
    #[arg(short, long)]
    input: PathBuf,

    /// Schema name used to address the dataset
    #[arg(long, default_value = "default")]
    schema: String,

    /// Table name used to address the dataset
    ///
    /// If not specified, uses the input file name without extension
    #[arg(long)]
    table: Option<String>,

    /// Key columns forming the logical row identity (comma separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    key_columns: Vec<String>,

    /// Date column holding each row's last update date
    ///
    /// If not specified, the update cadence check is skipped
    #[arg(long)]
    lud_column: Option<String>,

    /// Partition predicate as column=value or column=v1,v2 (repeatable)
    #[arg(short, long)]
    partition: Vec<String>,

    /// Number of prior distinct dates the moving average covers
    #[arg(long, default_value_t = DEFAULT_MOVING_AVERAGE_WINDOW)]
    window: usize,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so the JSON report on stdout stays pipeable.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let started = Instant::now();
    info!("Loading dataset from: {}", args.input.display());
    let df = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let table = TableRef::new(&args.schema, table_name(&args));
    let backend = DataFrameBackend::new().with_table(table.clone(), df);

    let mut dataset = DatasetRef::new(table);
    if let Some(partition) = parse_partitions(&args.partition)? {
        dataset = dataset.with_partition(partition);
    }

    let mut builder = CheckConfig::builder()
        .key_columns(args.key_columns.iter().cloned())
        .moving_average_window(args.window);
    if let Some(ref lud_column) = args.lud_column {
        builder = builder.lud_column(lud_column);
    }
    let config = builder.build()?;

    let report = CheckRunner::new(config).run(&backend, &dataset)?;
    info!(
        "Check battery finished in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    if report.has_failures() {
        warn!("One or more checks did not pass");
    }

    match args.output {
        Some(ref path) => {
            report.write_json(path)?;
            info!("Report written to: {}", path.display());
        }
        None => println!("{}", report.to_pretty_json()?),
    }

    Ok(())
}

/// Load the dataset, letting the reader infer types and parse ISO dates.
fn load_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))
}

/// Table name from the flag, or the input file stem.
fn table_name(args: &Args) -> String {
    args.table.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string()
    })
}

/// Fold repeated `column=value` / `column=v1,v2` specs into one predicate.
fn parse_partitions(specs: &[String]) -> Result<Option<Partition>> {
    if specs.is_empty() {
        return Ok(None);
    }

    let mut partition = Partition::new();
    for spec in specs {
        let (column, values) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid partition '{}', expected column=value", spec))?;
        partition = partition.one_of(column, values.split(','));
    }
    Ok(Some(partition))
}
