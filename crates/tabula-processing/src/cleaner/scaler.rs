//! Z-score standardization for numeric columns.
//!
//! Runs after encoding, so the numeric set is recomputed from column dtypes
//! rather than taken from the pre-encoding classification. Binary indicator
//! columns and constant columns are left on their original scale.

use crate::error::Result;
use crate::utils;
use polars::prelude::*;
use tracing::debug;

/// Standard deviations below this are treated as zero variance.
const VARIANCE_EPSILON: f64 = 1e-12;

/// Standardizes numeric columns to zero mean and unit variance.
pub struct NumericStandardizer;

impl NumericStandardizer {
    /// Scale every eligible numeric column to `(x - mean) / std` using the
    /// population standard deviation. Returns the names of the scaled
    /// columns in table column order.
    pub fn scale_table(
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut scaled = Vec::new();
        for name in names {
            let series = df.column(&name)?.as_materialized_series().clone();
            if !utils::is_numeric_dtype(series.dtype()) {
                continue;
            }

            let values = utils::collect_finite_values(&series)?;
            if values.is_empty() {
                continue;
            }
            if Self::is_binary_indicator(&values) {
                debug!("Column '{}' is a binary indicator, not scaling", name);
                continue;
            }

            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / values.len() as f64;
            let std = variance.sqrt();
            if std < VARIANCE_EPSILON {
                debug!("Column '{}' has zero variance, not scaling", name);
                continue;
            }

            let float_series = series.cast(&DataType::Float64)?;
            let standardized: Vec<Option<f64>> = float_series
                .f64()?
                .into_iter()
                .map(|opt_val| opt_val.map(|val| (val - mean) / std))
                .collect();

            df.replace(&name, Series::new(name.as_str().into(), standardized))?;
            scaled.push(name.clone());
            processing_steps.push(format!(
                "Standardized '{}' (mean {:.2}, std {:.2})",
                name, mean, std
            ));
        }

        Ok(scaled)
    }

    /// A column whose non-missing values all sit in {0, 1} is an indicator.
    fn is_binary_indicator(values: &[f64]) -> bool {
        values.iter().all(|v| *v == 0.0 || *v == 1.0)
    }
}
