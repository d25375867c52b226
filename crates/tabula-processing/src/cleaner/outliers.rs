//! Outlier handling for numeric columns.
//!
//! Extreme values are winsorized in place rather than dropped, so the row
//! count is never affected by this stage.

use crate::error::Result;
use crate::utils;
use polars::prelude::*;
use tracing::{debug, warn};

/// Handles outlier detection and treatment using the IQR rule.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Clamp each numeric column to `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    ///
    /// Quartiles are computed from the values as they stand before any
    /// clamping, with linear interpolation between ranks. Columns whose IQR
    /// is zero are left untouched. Returns the names of columns where at
    /// least one value actually moved.
    pub fn cap_outliers(
        df: &mut DataFrame,
        numeric_columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let mut affected = Vec::new();

        for name in numeric_columns {
            let Ok(col) = df.column(name) else {
                warn!("Column '{}' not found, skipping outlier capping", name);
                continue;
            };
            let series = col.as_materialized_series().clone();

            let sorted = utils::sorted_finite_values(&series)?;
            let (Some(q1), Some(q3)) = (
                utils::percentile_sorted(&sorted, 0.25),
                utils::percentile_sorted(&sorted, 0.75),
            ) else {
                continue;
            };

            let iqr = q3 - q1;
            if iqr <= 0.0 {
                debug!("Column '{}' has zero IQR, skipping outlier capping", name);
                continue;
            }

            let lower = q1 - 1.5 * iqr;
            let upper = q3 + 1.5 * iqr;

            let float_series = series.cast(&DataType::Float64)?;
            let chunked = float_series.f64()?;

            let mut capped: Vec<Option<f64>> = Vec::with_capacity(chunked.len());
            let mut moved = 0usize;
            for opt_val in chunked.into_iter() {
                match opt_val {
                    Some(val) if val.is_finite() => {
                        let clamped = val.clamp(lower, upper);
                        if clamped != val {
                            moved += 1;
                        }
                        capped.push(Some(clamped));
                    }
                    other => capped.push(other),
                }
            }

            if moved > 0 {
                df.replace(name, Series::new(name.as_str().into(), capped))?;
                affected.push(name.clone());
                processing_steps.push(format!(
                    "Capped {} outliers in '{}' to [{:.2}, {:.2}]",
                    moved, name, lower, upper
                ));
                debug!("Capped {} outliers in '{}'", moved, name);
            }
        }

        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== cap_outliers tests ====================

    #[test]
    fn test_cap_outliers_clamps_high_value() {
        // Sorted values [1, 2, 3, 4, 1000]: Q1 = 2, Q3 = 4, IQR = 2,
        // bounds = [-1, 7]. Only 1000 moves, down to 7.
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 1000.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        assert_eq!(affected, vec!["value".to_string()]);
        let col = df.column("value").unwrap().f64().unwrap();
        let values: Vec<f64> = col.into_iter().flatten().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 7.0]);
        assert!(steps.iter().any(|s| s.contains("Capped 1 outliers in 'value'")));
    }

    #[test]
    fn test_cap_outliers_clamps_low_value() {
        // Sorted values [-1000, 10, 11, 12, 13]: Q1 = 10, Q3 = 12, IQR = 2,
        // lower bound = 7.
        let mut df = df![
            "value" => [-1000.0, 10.0, 11.0, 12.0, 13.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        assert_eq!(affected.len(), 1);
        let col = df.column("value").unwrap().f64().unwrap();
        let min_val = col.min().unwrap();
        assert_eq!(min_val, 7.0);
    }

    #[test]
    fn test_cap_outliers_zero_iqr_skipped() {
        let mut df = df![
            "constant" => [5.0, 5.0, 5.0, 5.0, 5.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["constant".to_string()], &mut steps).unwrap();

        assert!(affected.is_empty());
        assert!(steps.is_empty());
        let col = df.column("constant").unwrap().f64().unwrap();
        let values: Vec<f64> = col.into_iter().flatten().collect();
        assert_eq!(values, vec![5.0; 5]);
    }

    #[test]
    fn test_cap_outliers_no_outliers_leaves_column_untouched() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        // Bounds are [-2, 8], nothing moves, column is not reported.
        assert!(affected.is_empty());
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_cap_outliers_bounds_from_unclipped_values() {
        // Two extremes at once: bounds come from the original distribution,
        // so both are clamped against the same [Q1, Q3] pair.
        let mut df = df![
            "value" => [-500.0, 10.0, 11.0, 12.0, 13.0, 14.0, 500.0],
        ]
        .unwrap();
        let mut steps = vec![];

        OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        // Sorted: [-500, 10, 11, 12, 13, 14, 500]; Q1 = 10.5, Q3 = 13.5,
        // IQR = 3, bounds = [6, 18].
        let col = df.column("value").unwrap().f64().unwrap();
        assert_eq!(col.min().unwrap(), 6.0);
        assert_eq!(col.max().unwrap(), 18.0);
    }

    #[test]
    fn test_cap_outliers_preserves_nulls() {
        let mut df = df![
            "value" => [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(1000.0)],
        ]
        .unwrap();
        let mut steps = vec![];

        OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        let col = df.column("value").unwrap();
        assert_eq!(col.null_count(), 1);
        assert_eq!(df.height(), 6);
    }

    #[test]
    fn test_cap_outliers_missing_column_skipped() {
        let mut df = df![
            "present" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["absent".to_string()], &mut steps).unwrap();

        assert!(affected.is_empty());
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_cap_outliers_integer_column_becomes_float() {
        let mut df = df![
            "value" => [1i64, 2, 3, 4, 1000],
        ]
        .unwrap();
        let mut steps = vec![];

        let affected =
            OutlierHandler::cap_outliers(&mut df, &["value".to_string()], &mut steps).unwrap();

        assert_eq!(affected.len(), 1);
        assert_eq!(df.column("value").unwrap().dtype(), &DataType::Float64);
        let col = df.column("value").unwrap().f64().unwrap();
        assert_eq!(col.max().unwrap(), 7.0);
    }
}
