//! Integration tests for the tabular cleaning and profiling pipeline.
//!
//! These tests verify end-to-end behavior of the pipeline using CSV fixtures.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;
use tabula_processing::{CleaningConfig, DataProfiler, Pipeline, ReportGenerator, RunReport};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn column_f64(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

fn raw_config() -> CleaningConfig {
    CleaningConfig::builder()
        .scale_numeric(false)
        .encode_categorical(false)
        .handle_outliers(false)
        .build()
        .unwrap()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_people_dataset() {
    let df = load_csv("people.csv");
    assert_eq!(df.shape(), (5, 3));

    let run = Pipeline::with_defaults().process(df).unwrap();

    assert!(!run.is_degraded());
    assert_eq!(run.summary.original_shape, (5, 3));
    assert_eq!(run.summary.basic_shape, (4, 3));
    assert_eq!(run.summary.final_shape, (4, 4));
    assert_eq!(run.summary.duplicates_removed, 1);
    assert_eq!(run.summary.missing_before, 1);
    assert_eq!(run.summary.missing_after, 0);

    // dept is one-hot encoded: the original column is replaced by
    // indicators for every level but the lexically first (Finance).
    assert!(run.table.column("dept").is_err());
    assert!(run.table.column("dept_HR").is_ok());
    assert!(run.table.column("dept_IT").is_ok());

    assert_eq!(run.report.numeric_scaled, vec!["age".to_string()]);
    assert_eq!(run.report.categorical_encoded, vec!["dept".to_string()]);
    assert_eq!(run.report.datetime_columns, vec!["joined_date".to_string()]);
    assert!(run.report.outliers_handled);

    // Standardized ages center on zero.
    let ages = column_f64(&run.table, "age");
    let mean: f64 = ages.iter().sum::<f64>() / ages.len() as f64;
    assert!(mean.abs() < 1e-9);
}

#[test]
fn test_median_imputation_visible_without_scaling() {
    let df = load_csv("people.csv");

    let config = CleaningConfig::builder()
        .scale_numeric(false)
        .handle_outliers(false)
        .build()
        .unwrap();
    let run = Pipeline::new(config).unwrap().process(df).unwrap();

    // Median of [25, 30, 40] fills the gap.
    let ages = column_f64(&run.table, "age");
    assert_eq!(ages, vec![25.0, 30.0, 30.0, 40.0]);
}

#[test]
fn test_outlier_capping_at_iqr_fence() {
    let df = load_csv("sensors.csv");

    let config = CleaningConfig::builder().scale_numeric(false).build().unwrap();
    let run = Pipeline::new(config).unwrap().process(df).unwrap();

    // [1, 2, 3, 4, 1000]: Q1 = 2, Q3 = 4, upper fence = 7.
    let readings = column_f64(&run.table, "reading");
    assert_eq!(readings, vec![1.0, 2.0, 3.0, 4.0, 7.0]);
    assert!(run.report.outliers_handled);
}

#[test]
fn test_label_encoding_assigns_sorted_codes() {
    let df = load_csv("status.csv");

    // cat_threshold 2 pushes the three status levels past one-hot
    // territory into label encoding.
    let config = CleaningConfig::builder()
        .scale_numeric(false)
        .cat_threshold(2)
        .build()
        .unwrap();
    let run = Pipeline::new(config).unwrap().process(df).unwrap();

    let codes: Vec<i32> = run
        .table
        .column("status")
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(codes, vec![0, 1, 0, 2, 0, 1]);
}

#[test]
fn test_numeric_strings_coerced_through_pipeline() {
    let df = df![
        "amount" => ["10", "20", "30", "40", "50", "60"],
        "label" => ["a", "b", "a", "b", "a", "b"],
    ]
    .unwrap();

    let config = CleaningConfig::builder()
        .scale_numeric(false)
        .encode_categorical(false)
        .build()
        .unwrap();
    let run = Pipeline::new(config).unwrap().process(df).unwrap();

    let amounts = column_f64(&run.table, "amount");
    assert_eq!(amounts, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
}

#[test]
fn test_basic_only_run_skips_stages() {
    let df = load_csv("people.csv");

    let run = Pipeline::with_defaults().process_basic(df).unwrap();

    // Dedup and name normalization happen, the stage chain does not.
    assert_eq!(run.summary.basic_shape, run.summary.final_shape);
    assert_eq!(run.summary.missing_after, 1);
    assert!(run.table.column("dept").is_ok());
    assert!(run.report.numeric_scaled.is_empty());
    assert!(run.report.categorical_encoded.is_empty());
}

#[test]
fn test_stage_flags_disable_stages() {
    let df = load_csv("people.csv");

    let run = Pipeline::new(raw_config()).unwrap().process(df).unwrap();

    assert!(run.report.numeric_scaled.is_empty());
    assert!(run.report.categorical_encoded.is_empty());
    assert!(!run.report.outliers_handled);
    assert!(run.table.column("dept").is_ok());
    // Imputation always runs.
    assert_eq!(run.summary.missing_after, 0);
}

// ============================================================================
// Profiling Tests
// ============================================================================

#[test]
fn test_profile_of_raw_dataset_quality_score() {
    let df = load_csv("people.csv");

    let profile = DataProfiler::profile(&df, &CleaningConfig::default()).unwrap();

    // Penalties: 1 of 15 cells missing (2.67), 1 of 5 rows duplicated
    // (6.0), and "Joined Date" is not identifier-like (3.33).
    assert_eq!(profile.quality_score, 88.0);
    assert_eq!(profile.missing_cells, 1);
    assert_eq!(profile.duplicate_rows, 1);
    assert_eq!(profile.shape, (5, 3));
}

#[test]
fn test_profile_detects_strong_correlation() {
    let df = load_csv("correlated.csv");

    let profile = DataProfiler::profile(&df, &CleaningConfig::default()).unwrap();

    assert_eq!(profile.correlation["x"]["y"], 1.0);
    assert_eq!(profile.quality_score, 100.0);

    let relationships = profile
        .smart_insights
        .iter()
        .find(|i| i.title == "Key Relationships")
        .expect("strong correlation should produce a relationship insight");
    assert!(
        relationships
            .content
            .contains("Strong positive relation between x and y")
    );
}

#[test]
fn test_snapshot_insight_always_first() {
    let df = load_csv("people.csv");

    let profile = DataProfiler::profile(&df, &CleaningConfig::default()).unwrap();

    let first = &profile.smart_insights[0];
    assert_eq!(first.title, "Dataset Snapshot");
    assert!(first.content.contains("5 rows and 3 columns"));
    assert!(first.content.contains("88.0/100"));
}

#[test]
fn test_missing_data_insight_names_worst_columns() {
    let df = load_csv("people.csv");

    let profile = DataProfiler::profile(&df, &CleaningConfig::default()).unwrap();

    let alerts = profile
        .smart_insights
        .iter()
        .find(|i| i.title == "Data Quality Alerts")
        .expect("missing cells should produce a quality alert insight");
    assert!(alerts.content.contains("Age: 20.0% missing"));
}

#[test]
fn test_quality_score_bounds_hold() {
    for fixture in ["people.csv", "sensors.csv", "status.csv", "correlated.csv"] {
        let df = load_csv(fixture);
        let profile = DataProfiler::profile(&df, &CleaningConfig::default()).unwrap();
        assert!(
            (0.0..=100.0).contains(&profile.quality_score),
            "score out of range for {}: {}",
            fixture,
            profile.quality_score
        );
    }
}

// ============================================================================
// Edge Case Tests
// ============================================================================

#[test]
fn test_headers_only_dataset_is_rejected() {
    let df = load_csv("headers_only.csv");
    assert_eq!(df.height(), 0);

    let err = Pipeline::with_defaults().process(df).unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(err.to_string(), "The dataset is empty");
}

#[test]
fn test_zero_width_dataset_is_rejected() {
    let df = DataFrame::empty();

    let err = Pipeline::with_defaults().process(df).unwrap_err();
    assert_eq!(err.to_string(), "No columns found in dataset");
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_json_round_trip() {
    let df = load_csv("people.csv");
    let run = Pipeline::with_defaults().process(df).unwrap();

    let report = ReportGenerator::build_report("people.csv", Some("people_cleaned.csv"), &run);
    let json = serde_json::to_string(&report).unwrap();
    let parsed: RunReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.input_file, "people.csv");
    assert_eq!(parsed.output_file.as_deref(), Some("people_cleaned.csv"));
    assert_eq!(parsed.profile.quality_score, run.profile.quality_score);
    assert_eq!(parsed.summary.duplicates_removed, 1);
}

#[test]
fn test_cleaned_table_written_as_csv() {
    let df = load_csv("people.csv");
    let mut run = Pipeline::with_defaults().process(df).unwrap();

    let dir = std::env::temp_dir().join("tabula_integration_csv");
    let path = dir.join("people_cleaned.csv");
    ReportGenerator::write_table(&mut run.table, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let header = content.lines().next().unwrap();
    assert!(header.contains("age"));
    assert!(header.contains("dept_IT"));
    // Header plus four data rows.
    assert_eq!(content.lines().count(), 5);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_report_written_to_disk() {
    let df = load_csv("people.csv");
    let run = Pipeline::with_defaults().process(df).unwrap();

    let dir = std::env::temp_dir().join("tabula_integration_report");
    let generator = ReportGenerator::new(dir.clone(), None);
    let report = ReportGenerator::build_report("people.csv", None, &run);
    let path = generator.write_report_to_file(&report, "people").unwrap();

    assert_eq!(path, dir.join("people_report.json"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"quality_score\""));
    std::fs::remove_dir_all(&dir).ok();
}
