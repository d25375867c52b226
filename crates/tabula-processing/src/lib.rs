//! Tabular Data Cleaning and Profiling Library
//!
//! A deterministic data cleaning and profiling library built with Rust and Polars.
//!
//! # Overview
//!
//! This library turns a raw tabular dataset into an analysis-ready one and
//! explains what it did:
//!
//! - **Type Inference**: Columns are classified as numeric, categorical, or datetime
//! - **Basic Cleaning**: Duplicate removal, empty-row dropping, column name normalization
//! - **Imputation**: Median fill for numeric columns, mode fill for categorical ones
//! - **Outlier Containment**: Values outside 1.5x IQR are capped at the fence
//! - **Encoding**: One-hot, label, or frequency encoding chosen by cardinality
//! - **Standardization**: Z-score scaling of numeric columns
//! - **Profiling**: Per-column statistics, correlations, a composite quality score,
//!   column alerts, and narrative insights
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabula_processing::Pipeline;
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! let run = Pipeline::with_defaults().process(df)?;
//!
//! println!("Quality score: {:.1}/100", run.profile.quality_score);
//! println!("Shape: {:?} -> {:?}", run.summary.original_shape, run.summary.final_shape);
//! for insight in &run.profile.smart_insights {
//!     println!("{}\n{}", insight.title, insight.content);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`CleaningConfig`] to customize cleaning behavior:
//!
//! ```rust,ignore
//! use tabula_processing::{CleaningConfig, Pipeline};
//!
//! let config = CleaningConfig::builder()
//!     .scale_numeric(false)        // Keep original numeric scales
//!     .cat_threshold(20)           // One-hot encode below 20 distinct values
//!     .high_card_threshold(500)    // Frequency-encode at 500 distinct values
//!     .datetime_threshold(0.9)     // Require 90% parseable dates
//!     .build()?;
//!
//! let run = Pipeline::new(config)?.process(df)?;
//! ```
//!
//! # Degraded Runs
//!
//! A failure inside imputation, outlier capping, encoding, or scaling does not
//! abort the run. The pipeline falls back to the basic-cleaned table and records
//! the reason in [`CleaningReport::error`]; only invalid input (an empty table
//! or one with no columns) is returned as an error.

// Core modules
pub mod classifier;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use classifier::{Classification, classify_column, classify_table, describe_columns};
pub use cleaner::{CategoricalEncoder, DataCleaner, NumericStandardizer, OutlierHandler};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::Pipeline;
pub use profiler::DataProfiler;
pub use quality::DataQualityAnalyzer;
pub use reporting::{InsightGenerator, ReportGenerator, RunReport};
pub use types::{
    AlertSeverity, CleaningOutcome, CleaningReport, ColumnAlert, ColumnDescriptor, ColumnKind,
    ColumnProfile, ColumnTypes, Insight, NumericSummary, PipelineRun, Profile, RunSummary,
    ValueCount,
};
pub use utils::{
    fill_numeric_nulls, fill_string_nulls, is_datetime_dtype, is_numeric_dtype,
    normalize_column_name, normalize_column_names,
};
