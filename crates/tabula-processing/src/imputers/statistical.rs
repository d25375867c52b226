//! Statistical imputation methods.
//!
//! Numeric columns are filled with the column median, categorical columns
//! with the most frequent value (or the literal "Unknown" when no value
//! exists). Datetime columns pass through untouched. Each column is
//! imputed independently of every other column.

use crate::types::ColumnTypes;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Impute every numeric and categorical column with missing cells.
    ///
    /// After this, numeric and categorical columns that had at least one
    /// non-missing value have a missing count of zero.
    pub fn impute_table(
        df: &mut DataFrame,
        types: &ColumnTypes,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        for col_name in &types.numeric {
            Self::apply_numeric_median(df, col_name, processing_steps)?;
        }
        for col_name in &types.categorical {
            Self::apply_categorical_mode(df, col_name, processing_steps)?;
        }
        // Datetime columns are not imputed by this stage.
        Ok(())
    }

    /// Fill missing cells of a numeric column with its median.
    ///
    /// A column with no non-missing values has an undefined median and is
    /// left unchanged.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        if let Ok(col) = df.column(col_name) {
            let series = col.as_materialized_series().clone();
            if series.null_count() == 0 {
                return Ok(());
            }

            match series.median() {
                Some(median_val) => {
                    let filled = fill_numeric_nulls(&series, median_val)?;
                    df.replace(col_name, filled)?;
                    processing_steps.push(format!(
                        "Filled '{}' with median: {:.2}",
                        col_name, median_val
                    ));
                }
                None => {
                    debug!(column = col_name, "all values missing, median undefined, left unchanged");
                }
            }
        }
        Ok(())
    }

    /// Fill missing cells of a categorical column with its mode, or with
    /// the literal "Unknown" when the column has no values at all.
    pub fn apply_categorical_mode(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        if let Ok(col) = df.column(col_name) {
            let series = col.as_materialized_series().clone();
            if series.null_count() == 0 {
                return Ok(());
            }

            match string_mode(&series) {
                Some(mode_val) => {
                    let filled = fill_string_nulls(&series, &mode_val)?;
                    df.replace(col_name, filled)?;
                    processing_steps.push(format!(
                        "Filled '{}' with mode: '{}'",
                        col_name, mode_val
                    ));
                }
                None => {
                    let filled = fill_string_nulls(&series, "Unknown")?;
                    df.replace(col_name, filled)?;
                    processing_steps.push(format!(
                        "Filled '{}' with constant value: 'Unknown'",
                        col_name
                    ));
                }
            }
        }
        Ok(())
    }
}
