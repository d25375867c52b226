//! Statistical profiling module.
//!
//! This module builds the full [`Profile`] for a table: per-column
//! statistics, the Pearson correlation matrix, duplicate and missing-cell
//! accounting, the composite quality score, per-column alerts, and the
//! templated narrative findings.

mod statistics;

use crate::classifier;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::quality::DataQualityAnalyzer;
use crate::reporting::InsightGenerator;
use crate::types::{ColumnKind, ColumnProfile, ColumnTypes, NumericSummary, Profile};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How many top values to keep per categorical or datetime column.
const TOP_VALUE_COUNT: usize = 10;

/// Statistical profiler for raw or cleaned tables.
pub struct DataProfiler;

impl DataProfiler {
    /// Build the full profile for a table.
    ///
    /// Column kinds are re-derived with the same classifier the cleaner
    /// uses, so a raw table is profiled on coerced values. Per-column
    /// statistic failures degrade to empty summaries and are logged;
    /// only input and classification errors propagate.
    pub fn profile(df: &DataFrame, config: &CleaningConfig) -> Result<Profile> {
        let (table, types) = classifier::classify_table(df.clone(), config)?;

        let mut columns = Vec::new();
        for name in table.get_column_names() {
            columns.push(Self::profile_column(&table, name.as_str(), &types)?);
        }

        let missing_cells = table.get_columns().iter().map(|c| c.null_count()).sum();
        let duplicate_rows = table.height()
            - table
                .unique_stable(None, UniqueKeepStrategy::First, None)?
                .height();

        let correlation = Self::correlation_matrix(&table, &types)?;
        let quality_score = DataQualityAnalyzer::calculate_quality_score(&table, &types);
        let column_alerts = DataQualityAnalyzer::column_alerts(&columns, table.height());

        let mut profile = Profile {
            shape: table.shape(),
            quality_score,
            missing_cells,
            duplicate_rows,
            columns,
            correlation,
            column_alerts,
            smart_insights: Vec::new(),
        };
        profile.smart_insights = InsightGenerator::generate(&profile);

        debug!(
            "Profiled {} columns, quality score {}",
            profile.columns.len(),
            profile.quality_score
        );
        Ok(profile)
    }

    fn profile_column(df: &DataFrame, name: &str, types: &ColumnTypes) -> Result<ColumnProfile> {
        let column = df.column(name)?;
        let series = column.as_materialized_series();
        let missing_count = series.null_count();
        let count = series.len() - missing_count;
        let unique_count = series.drop_nulls().n_unique()?;
        let kind = types.kind_of(name).unwrap_or(ColumnKind::Categorical);

        let (numeric, top_values) = match kind {
            ColumnKind::Numeric => {
                let summary = match statistics::numeric_summary(series) {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!("Numeric summary failed for '{}': {}", name, e);
                        NumericSummary::default()
                    }
                };
                (Some(summary), None)
            }
            ColumnKind::Categorical | ColumnKind::Datetime => {
                let top = match statistics::top_values(series, TOP_VALUE_COUNT) {
                    Ok(top) => top,
                    Err(e) => {
                        warn!("Top values failed for '{}': {}", name, e);
                        Vec::new()
                    }
                };
                (None, Some(top))
            }
        };

        Ok(ColumnProfile {
            name: name.to_string(),
            kind,
            count,
            missing_count,
            unique_count,
            numeric,
            top_values,
        })
    }

    /// Pairwise-complete Pearson correlations over numeric columns,
    /// rounded to 2 decimals. Undefined entries coerce to 0.0, the
    /// diagonal is 1.0 and the map is empty without numeric columns.
    fn correlation_matrix(
        df: &DataFrame,
        types: &ColumnTypes,
    ) -> Result<BTreeMap<String, BTreeMap<String, f64>>> {
        let mut matrix = BTreeMap::new();
        for first in &types.numeric {
            let mut row = BTreeMap::new();
            for second in &types.numeric {
                let r = if first == second {
                    1.0
                } else {
                    let a = df.column(first)?.as_materialized_series();
                    let b = df.column(second)?.as_materialized_series();
                    match statistics::pearson_correlation(a, b) {
                        Ok(Some(r)) => (r * 100.0).round() / 100.0,
                        Ok(None) => 0.0,
                        Err(e) => {
                            debug!("Correlation failed for '{}'/'{}': {}", first, second, e);
                            0.0
                        }
                    }
                };
                row.insert(second.clone(), r);
            }
            matrix.insert(first.clone(), row);
        }
        Ok(matrix)
    }
}
