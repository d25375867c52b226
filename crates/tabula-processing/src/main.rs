//! CLI entry point for the tabular cleaning and profiling pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use rand::prelude::*;
use std::path::{Path, PathBuf};
use tabula_processing::{
    AlertSeverity, CleaningConfig, DataProfiler, Pipeline, PipelineRun, ReportGenerator,
    RunReport, utils,
};
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Deterministic tabular data cleaning and profiling",
    long_about = "A deterministic data cleaning and profiling tool built on Polars.\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV and write the result\n  \
                  tabula-processing data.csv -o outputs/data_cleaned.csv\n\n  \
                  # Preview what a run would do\n  \
                  tabula-processing data.csv --dry-run\n\n  \
                  # Machine-readable report on stdout\n  \
                  tabula-processing data.csv --json | jq .profile.quality_score\n\n  \
                  # Keep original scales and encodings\n  \
                  tabula-processing data.csv --no-scale --no-encode -o cleaned.csv"
)]
struct Args {
    /// Path to the CSV file to process
    input: String,

    /// Path for the cleaned CSV output
    #[arg(short, long)]
    output: Option<String>,

    /// Write a <input_stem>_report.json with the full run report
    #[arg(long)]
    report: bool,

    /// Output the full report as JSON to stdout instead of a summary
    ///
    /// Disables all logs so stdout carries only the JSON report.
    /// Useful for piping: `... --json | jq .profile.quality_score`
    #[arg(long)]
    json: bool,

    /// Stop after basic cleaning (dedupe, drop empty rows, rename, classify)
    #[arg(long)]
    basic_only: bool,

    /// Skip z-score standardization of numeric columns
    #[arg(long)]
    no_scale: bool,

    /// Skip categorical encoding
    #[arg(long)]
    no_encode: bool,

    /// Skip IQR outlier capping
    #[arg(long)]
    no_outliers: bool,

    /// Distinct-value count below which categoricals are one-hot encoded
    #[arg(long, default_value = "50")]
    cat_threshold: usize,

    /// Distinct-value count at which label encoding gives way to frequency encoding
    #[arg(long, default_value = "1000")]
    high_card_threshold: usize,

    /// Fraction of values that must parse as dates to detect a datetime column (0.0 - 1.0)
    #[arg(long, default_value = "0.8")]
    datetime_threshold: f64,

    /// Preview the run without processing or writing files
    #[arg(long)]
    dry_run: bool,

    /// Suppress progress output (only warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging stays uninitialized so stdout only
/// contains the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let config = build_config(&args)?;

    if args.dry_run {
        return run_dry_run(&args, &data, &config);
    }

    let pipeline = Pipeline::new(config)?;
    let result = if args.basic_only {
        pipeline.process_basic(data)
    } else {
        pipeline.process(data)
    };

    match result {
        Ok(run) => handle_output(run, &args),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

fn build_config(args: &Args) -> Result<CleaningConfig> {
    CleaningConfig::builder()
        .scale_numeric(!args.no_scale)
        .encode_categorical(!args.no_encode)
        .handle_outliers(!args.no_outliers)
        .cat_threshold(args.cat_threshold)
        .high_card_threshold(args.high_card_threshold)
        .datetime_threshold(args.datetime_threshold)
        .build()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the report JSON to stdout only (no logs)
/// - `--report`: additionally write the report JSON to a file
fn handle_output(mut run: PipelineRun, args: &Args) -> Result<()> {
    if run.is_degraded()
        && let Some(ref reason) = run.report.error
    {
        warn!("Run degraded to the basic-cleaned table: {}", reason);
    }

    let output_path = args.output.as_ref().map(PathBuf::from);
    if let Some(ref path) = output_path {
        ReportGenerator::write_table(&mut run.table, path)?;
    }

    let report = ReportGenerator::build_report(
        &args.input,
        output_path.as_deref().and_then(Path::to_str),
        &run,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.report {
        let stem = extract_file_stem(&args.input);
        let generator = ReportGenerator::new(report_dir(output_path.as_deref()), None);
        let report_path = generator.write_report_to_file(&report, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_summary(&report, args);

    Ok(())
}

/// Directory for the report file: next to the cleaned CSV when one was
/// written, `./outputs` otherwise.
fn report_dir(output_path: Option<&Path>) -> PathBuf {
    match output_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("./outputs"),
    }
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn severity_label(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Warning => "warning",
        AlertSeverity::Info => "info",
    }
}

/// Print a human-readable summary of the run.
///
/// This is the default output when `--json` is not specified.
fn print_summary(report: &RunReport, args: &Args) {
    let summary = &report.summary;
    let cleaning = &report.cleaning;
    let profile = &report.profile;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, summary.original_shape.0, summary.original_shape.1
    );
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file, summary.final_shape.0, summary.final_shape.1
        );
    }
    println!();

    if let Some(ref reason) = cleaning.error {
        println!("NOTE: intermediate cleaning failed; output is the basic-cleaned table.");
        println!("      {}", reason);
        println!();
    }

    println!("Run Summary:");
    println!(
        "  Rows: {} -> {} ({} removed by basic cleaning)",
        summary.original_shape.0, summary.final_shape.0, summary.duplicates_removed
    );
    println!(
        "  Missing cells: {} -> {}",
        summary.missing_before, summary.missing_after
    );
    println!("  Data Quality Score: {:.1}/100", profile.quality_score);
    println!();

    let acted = !cleaning.numeric_scaled.is_empty()
        || !cleaning.categorical_encoded.is_empty()
        || cleaning.outliers_handled
        || !cleaning.datetime_columns.is_empty();
    if acted {
        println!("Cleaning Actions:");
        if cleaning.outliers_handled {
            println!("  - Capped outliers at IQR bounds");
        }
        if !cleaning.categorical_encoded.is_empty() {
            println!(
                "  - Encoded {} categorical column(s): {}",
                cleaning.categorical_encoded.len(),
                cleaning.categorical_encoded.join(", ")
            );
        }
        if !cleaning.numeric_scaled.is_empty() {
            println!(
                "  - Standardized {} numeric column(s): {}",
                cleaning.numeric_scaled.len(),
                cleaning.numeric_scaled.join(", ")
            );
        }
        if !cleaning.datetime_columns.is_empty() {
            println!(
                "  - Detected datetime column(s): {}",
                cleaning.datetime_columns.join(", ")
            );
        }
        println!();
    }

    if !profile.column_alerts.is_empty() {
        println!("Column Alerts:");
        for alert in profile.column_alerts.iter().take(8) {
            println!(
                "  - [{}] {}: {}",
                severity_label(alert.severity),
                alert.column,
                alert.message
            );
        }
        if profile.column_alerts.len() > 8 {
            println!("  ... and {} more", profile.column_alerts.len() - 8);
        }
        println!();
    }

    if !profile.smart_insights.is_empty() {
        println!("Insights:");
        for insight in &profile.smart_insights {
            println!("  {}", insight.title);
            for line in insight.content.lines() {
                println!("    {}", line);
            }
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    if !args.report {
        println!("Use --report to save the full JSON report");
    }
    println!("{}", "=".repeat(80));
}

/// Run dry-run mode: show what a run would do without processing.
///
/// This function uses `println!` intentionally for user-facing CLI output;
/// it must stay visible regardless of log level settings.
fn run_dry_run(args: &Args, data: &DataFrame, config: &CleaningConfig) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning actions");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    let profile = DataProfiler::profile(data, config)?;

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<10} {:<8} {:<25}",
        "Column", "Type", "Missing %", "Unique", "Sample"
    );
    println!("{}", "-".repeat(78));

    for (column, col_profile) in data.get_columns().iter().zip(&profile.columns) {
        let missing_pct = if data.height() > 0 {
            col_profile.missing_count as f64 / data.height() as f64 * 100.0
        } else {
            0.0
        };
        let sample = sample_values(column.as_materialized_series(), 3).join(", ");
        println!(
            "{:<20} {:<12} {:<10.1} {:<8} {:<25}",
            truncate_str(&col_profile.name, 19),
            col_profile.kind.label(),
            missing_pct,
            col_profile.unique_count,
            truncate_str(&sample, 24)
        );
    }
    println!();

    println!("CLEANING PREVIEW");
    println!("{}", "-".repeat(40));

    let duplicate_count = data.height()
        - data
            .unique_stable(None, UniqueKeepStrategy::First, None)?
            .height();
    if duplicate_count > 0 {
        println!("  Will remove {} duplicate row(s)", duplicate_count);
    } else {
        println!("  No duplicate rows found");
    }

    let original_names: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let normalized = utils::normalize_column_names(&original_names);
    let renames: Vec<(&String, &String)> = original_names
        .iter()
        .zip(&normalized)
        .filter(|(from, to)| from != to)
        .collect();
    if renames.is_empty() {
        println!("  Column names already normalized");
    } else {
        for (from, to) in renames {
            println!("  Will rename '{}' -> '{}'", from, to);
        }
    }
    println!();

    println!("PLANNED ACTIONS");
    println!("{}", "-".repeat(40));
    println!("  1. Basic cleaning (dedupe, drop empty rows, normalize names, classify)");
    if args.basic_only {
        println!("  (stopping after basic cleaning: --basic-only)");
    } else {
        let mut step = 2;
        println!(
            "  {}. Impute missing values (numeric: median, categorical: mode)",
            step
        );
        step += 1;
        if config.handle_outliers {
            println!("  {}. Cap outliers at IQR bounds", step);
            step += 1;
        }
        if config.encode_categorical {
            println!(
                "  {}. Encode categorical columns (one-hot < {} distinct, label < {}, else frequency)",
                step, config.cat_threshold, config.high_card_threshold
            );
            step += 1;
        }
        if config.scale_numeric {
            println!("  {}. Standardize numeric columns (z-score)", step);
        }
    }
    println!();

    if !profile.column_alerts.is_empty() {
        println!("COLUMN ALERTS");
        println!("{}", "-".repeat(40));
        for alert in &profile.column_alerts {
            println!(
                "  - [{}] {}: {}",
                severity_label(alert.severity),
                alert.column,
                alert.message
            );
        }
        println!();
    }

    println!("OUTPUT FILES (with current flags)");
    println!("{}", "-".repeat(40));
    if let Some(ref output) = args.output {
        println!("  - {}", output);
    } else {
        println!("  - none (pass -o/--output to write the cleaned CSV)");
    }
    if args.report {
        let stem = extract_file_stem(&args.input);
        let dir = report_dir(args.output.as_deref().map(Path::new));
        println!("  - {}/{}_report.json", dir.display(), stem);
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To execute this run, drop --dry-run");
    if !args.report {
        println!("Add --report to save the full JSON report");
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Reproducible sample of up to `k` non-missing values from a column.
fn sample_values(series: &Series, k: usize) -> Vec<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Vec::new();
    }

    let sample_size = std::cmp::min(k, non_null.len());
    let mut rng = StdRng::seed_from_u64(42);
    let indices: Vec<usize> = (0..non_null.len()).collect();
    let mut sampled: Vec<usize> = indices
        .choose_multiple(&mut rng, sample_size)
        .copied()
        .collect();
    sampled.sort_unstable();

    let mut values = Vec::with_capacity(sample_size);
    for idx in sampled {
        if let Ok(val) = non_null.get(idx) {
            values.push(format!("{}", val));
        }
    }
    values
}

/// Truncate a string to max length with ellipsis.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

/// Load CSV with multiple fallback strategies.
fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: pre-clean the content in memory
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cleaned = clean_csv_content(&content);
            use std::io::Cursor;
            let cursor = Cursor::new(cleaned);

            CsvReadOptions::default()
                .with_infer_schema_length(Some(100))
                .with_has_header(true)
                .into_reader_with_file_handle(cursor)
                .finish()
                .map_err(|e| e.into())
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Collapse escaped quote runs and drop blank lines so malformed CSV
/// exports still parse.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
