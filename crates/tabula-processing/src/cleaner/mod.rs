//! Data cleaning module for preprocessing datasets.
//!
//! This module provides functionality for:
//! - Removing duplicate rows and all-missing rows
//! - Normalizing column names
//! - Running the configurable stage chain (impute, cap outliers, encode,
//!   standardize) with a degraded fallback when a stage fails

mod encoder;
mod outliers;
mod scaler;

pub use encoder::CategoricalEncoder;
pub use outliers::OutlierHandler;
pub use scaler::NumericStandardizer;

use crate::classifier;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::StatisticalImputer;
use crate::types::{CleaningOutcome, CleaningReport, ColumnTypes};
use crate::utils;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for automatic dataset cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Check the input invariants that abort a run.
    pub fn validate(df: &DataFrame) -> Result<()> {
        if df.width() == 0 {
            return Err(CleaningError::NoColumns);
        }
        if df.height() == 0 {
            return Err(CleaningError::EmptyTable);
        }
        Ok(())
    }

    /// Basic cleaning: deduplicate rows, drop all-missing rows, normalize
    /// column names, then classify and coerce column types.
    ///
    /// Never imputes, encodes, caps outliers, or scales.
    pub fn basic_clean(df: DataFrame, config: &CleaningConfig) -> Result<(DataFrame, ColumnTypes)> {
        Self::validate(&df)?;
        info!("Performing basic cleaning...");
        let mut df = df;

        // 1. Remove exact-duplicate rows, keeping the first occurrence
        let before_duplicates = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let duplicates_removed = before_duplicates - df.height();
        if duplicates_removed > 0 {
            debug!("Removed {} duplicate rows", duplicates_removed);
        }

        // 2. Remove rows where every cell is missing
        let before_rows = df.height();

        // Calculate null counts per row - iterate over columns and accumulate
        let mut null_counts = Series::new("nulls".into(), vec![0u32; df.height()]);
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let null_mask = series.is_null();
            if let Ok(null_int) = null_mask.cast(&DataType::UInt32)
                && let Ok(sum) = &null_counts + &null_int
            {
                null_counts = sum;
            }
        }

        let null_counts_f64 = null_counts.cast(&DataType::Float64)?;
        let total_cols = df.width() as f64;

        // Division: Series / f64 returns Series
        let null_fraction = &null_counts_f64 / total_cols;

        // Keep rows with at least one non-missing cell
        let mask = null_fraction.lt(1.0)?;
        df = df.filter(&mask)?;

        let empty_rows_removed = before_rows - df.height();
        if empty_rows_removed > 0 {
            debug!("Removed {} all-missing rows", empty_rows_removed);
        }

        // 3. Normalize column names (trim, lowercase, spaces to underscores)
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let normalized = utils::normalize_column_names(&names);
        if normalized != names {
            df.set_column_names(normalized)?;
            debug!("Normalized column names");
        }

        // 4. Classify columns and coerce string columns to inferred types
        let (df, types) = classifier::classify_table(df, config)?;

        info!("Basic cleaning completed: {:?}", df.shape());
        Ok((df, types))
    }

    /// Run the configured stage chain on an already basic-cleaned table.
    ///
    /// A stage failure does not propagate: the outcome degrades to the input
    /// table with `report.error` carrying the stage error string.
    pub fn intermediate_clean(
        df: DataFrame,
        types: &ColumnTypes,
        config: &CleaningConfig,
    ) -> Result<CleaningOutcome> {
        info!("Performing intermediate cleaning...");
        let original_shape = df.shape();
        let mut report = CleaningReport::new(original_shape);
        report.datetime_columns = types.datetime.clone();

        match Self::run_stages(df.clone(), types, config, &mut report) {
            Ok(table) => {
                report.final_shape = table.shape();
                info!("Intermediate cleaning completed: {:?}", table.shape());
                Ok(CleaningOutcome::Cleaned { table, report })
            }
            Err(e) => {
                warn!(
                    "Intermediate cleaning failed ({}), returning the basic-cleaned table",
                    e
                );
                let mut fallback = CleaningReport::new(original_shape);
                fallback.datetime_columns = types.datetime.clone();
                fallback.error = Some(e.to_string());
                Ok(CleaningOutcome::Degraded {
                    table: df,
                    report: fallback,
                })
            }
        }
    }

    /// One-shot entry point: basic cleaning followed by the stage chain.
    pub fn clean(df: DataFrame, config: &CleaningConfig) -> Result<CleaningOutcome> {
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        let (basic, types) = Self::basic_clean(df, config)?;
        Self::intermediate_clean(basic, &types, config)
    }

    fn run_stages(
        mut df: DataFrame,
        types: &ColumnTypes,
        config: &CleaningConfig,
        report: &mut CleaningReport,
    ) -> Result<DataFrame> {
        let mut steps: Vec<String> = Vec::new();

        StatisticalImputer::impute_table(&mut df, types, &mut steps).map_err(|e| {
            CleaningError::StageFailed {
                stage: "imputation".to_string(),
                reason: e.to_string(),
            }
        })?;

        if config.handle_outliers {
            let affected = OutlierHandler::cap_outliers(&mut df, &types.numeric, &mut steps)
                .map_err(|e| CleaningError::StageFailed {
                    stage: "outlier containment".to_string(),
                    reason: e.to_string(),
                })?;
            report.outliers_handled = !affected.is_empty();
        }

        if config.encode_categorical {
            report.categorical_encoded =
                CategoricalEncoder::encode_table(&mut df, &types.categorical, config, &mut steps)
                    .map_err(|e| CleaningError::StageFailed {
                        stage: "categorical encoding".to_string(),
                        reason: e.to_string(),
                    })?;
        }

        if config.scale_numeric {
            report.numeric_scaled = NumericStandardizer::scale_table(&mut df, &mut steps)
                .map_err(|e| CleaningError::StageFailed {
                    stage: "standardization".to_string(),
                    reason: e.to_string(),
                })?;
        }

        for step in &steps {
            debug!("{}", step);
        }
        Ok(df)
    }
}
