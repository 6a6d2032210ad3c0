use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use metar_explorer::config::{CategoricalDefaults, NormalizationConfig};
use metar_explorer::ingest::DataSource;
use metar_explorer::loader::{load, LoadOutcome};
use metar_explorer::query::{query, Aggregator, HourSet};

#[derive(Parser, Debug)]
#[command(
    name = "inspect-workbook",
    about = "Load a METAR report sheet and print load diagnostics and summary statistics"
)]
struct Args {
    /// Workbook (.xlsx/.xls/.ods) or CSV file
    #[arg(env = "DATA_PATH")]
    path: PathBuf,

    /// Sheet to read (first sheet by default)
    #[arg(long, env = "SHEET_NAME")]
    sheet: Option<String>,

    /// Inclusive start date (defaults to the first date in the data)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Inclusive end date (defaults to the last date in the data)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// UTC hours to keep, e.g. --hours 0,6,12,18
    #[arg(long, value_delimiter = ',')]
    hours: Vec<u32>,

    /// Categorical default preset: descriptive, metar or unknown
    /// (CATEGORICAL_DEFAULTS otherwise)
    #[arg(long)]
    defaults: Option<String>,

    /// Number of latest reports to print
    #[arg(long, default_value_t = 10)]
    latest: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.defaults {
        Some(name) => {
            let preset = CategoricalDefaults::preset(name)
                .ok_or_else(|| format!("Unknown defaults preset: {name}"))?;
            NormalizationConfig::from_env_with_preset(preset)
        }
        None => NormalizationConfig::from_env()?,
    };

    let mut source = DataSource::new(&args.path);
    if let Some(sheet) = &args.sheet {
        source = source.with_sheet(sheet.clone());
    }

    println!("Loading: {source}");
    let (store, report) = match load(&source, &config) {
        LoadOutcome::Loaded { store, report } => (store, report),
        LoadOutcome::Failed { reason } => {
            println!("Load failed: {reason}");
            return Ok(());
        }
    };

    println!("{}", "=".repeat(80));
    println!("Columns detected: {}", report.columns_found.join(", "));
    if !report.columns_missing.is_empty() {
        println!("Columns missing:  {}", report.columns_missing.join(", "));
    }
    println!(
        "Rows: {} read, {} loaded, {} dropped (unresolvable timestamp), {} unreadable",
        report.total_rows, report.rows_loaded, report.rows_dropped, report.rows_unreadable
    );

    let Some((min_date, max_date)) = store.date_bounds() else {
        println!("No observations loaded");
        return Ok(());
    };
    println!("Date range: {min_date} to {max_date}");

    let hours = if args.hours.is_empty() {
        None
    } else {
        Some(HourSet::new(args.hours.iter().copied())?)
    };
    let result = query(
        &store,
        args.start.unwrap_or(min_date),
        args.end.unwrap_or(max_date),
        hours,
    )?;

    println!("{}", "=".repeat(80));
    println!("Selected observations: {}", result.aggregates.observation_count);
    println!(
        "{:<16} {:>6} {:>10} {:>10} {:>10}",
        "field", "count", "mean", "min", "max"
    );
    for summary in &result.aggregates.fields {
        println!(
            "{:<16} {:>6} {:>10} {:>10} {:>10}",
            summary.field.name(),
            summary.count,
            fmt_stat(summary.mean),
            fmt_stat(summary.min),
            fmt_stat(summary.max)
        );
    }

    for dist in &result.aggregates.categories {
        println!("\n{:?}:", dist.field);
        for entry in dist.counts.iter().take(10) {
            println!("  {:<30} {:>6}", entry.value, entry.count);
        }
    }

    println!("\nLatest {} reports:", args.latest);
    let selection: Vec<_> = result.observations.iter().collect();
    let start = selection.len().saturating_sub(args.latest);
    for entry in Aggregator::log_entries(&selection[start..]) {
        println!("  {}  {}", entry.display_timestamp, entry.raw_report_text);
    }

    Ok(())
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| format!("{v:.1}"))
}

