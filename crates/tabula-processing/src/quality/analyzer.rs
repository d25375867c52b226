use crate::types::{AlertSeverity, ColumnAlert, ColumnKind, ColumnProfile, ColumnTypes};
use crate::utils;
use anyhow::Result;
use polars::prelude::*;
use tracing::warn;

/// |z| threshold above which a value counts toward the outlier penalty.
const OUTLIER_Z_THRESHOLD: f64 = 3.0;

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Composite Data Quality Score in [0, 100], rounded to one decimal.
    ///
    /// Starts at 100 and subtracts weighted penalties:
    /// missing-cell percentage x 0.4, duplicate-row percentage x 0.3,
    /// average per-numeric-column |z| > 3 outlier percentage x 0.2, and
    /// bad-column-name percentage x 0.1. Any computation failure yields 0.0.
    pub fn calculate_quality_score(df: &DataFrame, types: &ColumnTypes) -> f64 {
        match Self::quality_score_impl(df, types) {
            Ok(score) => score,
            Err(e) => {
                warn!("Quality score computation failed: {}", e);
                0.0
            }
        }
    }

    fn quality_score_impl(df: &DataFrame, types: &ColumnTypes) -> Result<f64> {
        let rows = df.height();
        let cols = df.width();
        if rows == 0 || cols == 0 {
            anyhow::bail!("table has no rows or no columns");
        }

        let total_cells = (rows * cols) as f64;
        let missing_cells: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
        let missing_pct = missing_cells as f64 / total_cells * 100.0;

        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let duplicate_pct = (rows - deduped.height()) as f64 / rows as f64 * 100.0;

        let outlier_pct = Self::average_outlier_percentage(df, &types.numeric)?;

        let bad_names = df
            .get_column_names()
            .iter()
            .filter(|name| Self::is_bad_column_name(name.as_str()))
            .count();
        let bad_name_pct = bad_names as f64 / cols as f64 * 100.0;

        let score = 100.0
            - missing_pct * 0.4
            - duplicate_pct * 0.3
            - outlier_pct * 0.2
            - bad_name_pct * 0.1;
        Ok((score.max(0.0) * 10.0).round() / 10.0)
    }

    /// Mean outlier percentage across numeric columns, using the population
    /// std of each column's non-missing values. Columns with no non-missing
    /// values are skipped; zero-variance columns contribute 0.
    fn average_outlier_percentage(df: &DataFrame, numeric_columns: &[String]) -> Result<f64> {
        let mut ratios = Vec::new();
        for name in numeric_columns {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let values = utils::collect_finite_values(column.as_materialized_series())?;
            if values.is_empty() {
                continue;
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            if std <= 0.0 {
                ratios.push(0.0);
                continue;
            }
            let outliers = values
                .iter()
                .filter(|v| ((*v - mean) / std).abs() > OUTLIER_Z_THRESHOLD)
                .count();
            ratios.push(outliers as f64 / n);
        }
        if ratios.is_empty() {
            return Ok(0.0);
        }
        Ok(ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0)
    }

    /// A column name is bad when it contains a space or is not a plain
    /// identifier (leading letter or underscore, then alphanumerics).
    fn is_bad_column_name(name: &str) -> bool {
        name.contains(' ') || !utils::is_identifier_name(name)
    }

    /// Deterministic per-column alerts, in the given column order.
    pub fn column_alerts(columns: &[ColumnProfile], total_rows: usize) -> Vec<ColumnAlert> {
        let mut alerts = Vec::new();
        for profile in columns {
            let missing_fraction = if total_rows > 0 {
                profile.missing_count as f64 / total_rows as f64
            } else {
                0.0
            };
            if missing_fraction > 0.5 {
                alerts.push(ColumnAlert {
                    column: profile.name.clone(),
                    severity: AlertSeverity::Warning,
                    message: "High missing values (>50%)".to_string(),
                });
            }
            if profile.unique_count == 1 {
                alerts.push(ColumnAlert {
                    column: profile.name.clone(),
                    severity: AlertSeverity::Warning,
                    message: "Zero variance (constant value)".to_string(),
                });
            }
            if profile.kind == ColumnKind::Numeric
                && let Some(numeric) = &profile.numeric
            {
                if profile.missing_count == 0 && numeric.std == Some(0.0) {
                    alerts.push(ColumnAlert {
                        column: profile.name.clone(),
                        severity: AlertSeverity::Warning,
                        message: "Zero variance".to_string(),
                    });
                }
                if let Some(skew) = numeric.skewness
                    && skew.abs() > 2.0
                {
                    alerts.push(ColumnAlert {
                        column: profile.name.clone(),
                        severity: AlertSeverity::Info,
                        message: format!("Highly skewed ({:.2})", skew),
                    });
                }
            }
            if profile.kind == ColumnKind::Categorical && profile.unique_count > 50 {
                alerts.push(ColumnAlert {
                    column: profile.name.clone(),
                    severity: AlertSeverity::Info,
                    message: format!("High cardinality ({} unique)", profile.unique_count),
                });
            }
        }
        alerts
    }
}
