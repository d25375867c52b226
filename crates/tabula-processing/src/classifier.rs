//! Column type classification and coercion.
//!
//! Every column is assigned one of {numeric, categorical, datetime}.
//! Classification is a pure function over the column values so threshold
//! behavior is directly testable; coercion happens separately at the table
//! level and replaces qualifying string columns with parsed values.

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::types::{ColumnDescriptor, ColumnKind, ColumnTypes};
use crate::utils::{is_boolean_dtype, is_datetime_dtype, is_numeric_dtype, parse_finite_f64};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

/// A string column qualifies as numeric only above this parse fraction
/// (strict) and with more than this many distinct raw values.
const NUMERIC_PARSE_FRACTION: f64 = 0.5;
const NUMERIC_DISTINCT_GUARD: usize = 5;

// Date format gates, compiled once. Each regex pre-filters a value before
// the exact chrono parse; the bool marks formats that carry a time part.
static DATE_FORMATS: Lazy<Vec<(Regex, &'static str, bool)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
            "%Y-%m-%d",
            false,
        ),
        (
            Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").expect("Invalid regex: YYYY/MM/DD"),
            "%Y/%m/%d",
            false,
        ),
        (
            Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: MM/DD/YYYY"),
            "%m/%d/%Y",
            false,
        ),
        (
            Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
            "%m-%d-%Y",
            false,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$")
                .expect("Invalid regex: datetime"),
            "%Y-%m-%d %H:%M:%S",
            true,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$").expect("Invalid regex: ISO"),
            "%Y-%m-%dT%H:%M:%S",
            true,
        ),
    ]
});

/// The kind a column was assigned, with the parse fraction that earned it.
///
/// Confidence is 1.0 for native dtypes and for the categorical fallback;
/// for reclassified string columns it is the fraction of values that parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: ColumnKind,
    pub confidence: f64,
}

impl Classification {
    fn certain(kind: ColumnKind) -> Self {
        Self {
            kind,
            confidence: 1.0,
        }
    }
}

/// Parse a single value against the supported date formats.
///
/// Date-only formats take midnight.
pub(crate) fn parse_datetime_str(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for (gate, format, has_time) in DATE_FORMATS.iter() {
        if !gate.is_match(trimmed) {
            continue;
        }
        if *has_time {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Some(dt);
            }
        } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_hms_opt(0, 0, 0)?);
        }
    }

    None
}

/// Classify a single column without touching its values.
///
/// String columns are tested in order: numeric (parse fraction strictly
/// above 0.5 and more than 5 distinct raw values), then datetime (parse
/// fraction at or above the configured threshold), else categorical.
/// Fractions are over the total row count, so missing cells count as
/// failed parses.
pub fn classify_column(series: &Series, config: &CleaningConfig) -> Classification {
    let dtype = series.dtype();

    if is_numeric_dtype(dtype) {
        return Classification::certain(ColumnKind::Numeric);
    }
    if is_datetime_dtype(dtype) {
        return Classification::certain(ColumnKind::Datetime);
    }
    if is_boolean_dtype(dtype) {
        // Flags are enumerable, not measurements.
        return Classification::certain(ColumnKind::Categorical);
    }
    if dtype != &DataType::String || series.is_empty() {
        return Classification::certain(ColumnKind::Categorical);
    }

    let total = series.len() as f64;

    let numeric_fraction = match numeric_parse_count(series) {
        Ok(count) => count as f64 / total,
        Err(e) => {
            debug!(column = %series.name(), error = %e, "numeric parse attempt failed");
            0.0
        }
    };
    if numeric_fraction > NUMERIC_PARSE_FRACTION
        && distinct_raw_values(series) > NUMERIC_DISTINCT_GUARD
    {
        return Classification {
            kind: ColumnKind::Numeric,
            confidence: numeric_fraction,
        };
    }

    let datetime_fraction = match datetime_parse_count(series) {
        Ok(count) => count as f64 / total,
        Err(e) => {
            debug!(column = %series.name(), error = %e, "datetime parse attempt failed");
            0.0
        }
    };
    if datetime_fraction >= config.datetime_threshold {
        return Classification {
            kind: ColumnKind::Datetime,
            confidence: datetime_fraction,
        };
    }

    Classification::certain(ColumnKind::Categorical)
}

fn numeric_parse_count(series: &Series) -> PolarsResult<usize> {
    let count = series
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| parse_finite_f64(v).is_some())
        .count();
    Ok(count)
}

fn datetime_parse_count(series: &Series) -> PolarsResult<usize> {
    let count = series
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| parse_datetime_str(v).is_some())
        .count();
    Ok(count)
}

fn distinct_raw_values(series: &Series) -> usize {
    series.drop_nulls().n_unique().unwrap_or(0)
}

/// Replace a string column with parsed Float64 values.
///
/// Unparsable cells become missing.
fn string_to_float_series(series: &Series) -> PolarsResult<Series> {
    let parsed: Vec<Option<f64>> = series
        .str()?
        .into_iter()
        .map(|opt| opt.and_then(parse_finite_f64))
        .collect();
    Ok(Series::new(series.name().clone(), parsed))
}

/// Replace a string column with parsed millisecond-resolution datetimes.
///
/// Unparsable cells become missing.
fn string_to_datetime_series(series: &Series) -> PolarsResult<Series> {
    let parsed: Vec<Option<i64>> = series
        .str()?
        .into_iter()
        .map(|opt| {
            opt.and_then(parse_datetime_str)
                .map(|dt| dt.and_utc().timestamp_millis())
        })
        .collect();
    Series::new(series.name().clone(), parsed)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Classify every column and coerce qualifying string columns in a new
/// table.
///
/// Returns the updated table plus three disjoint column-name lists. A
/// coercion that errors is logged and treated as "does not qualify"; it
/// never aborts the run.
pub fn classify_table(
    table: DataFrame,
    config: &CleaningConfig,
) -> Result<(DataFrame, ColumnTypes)> {
    let mut df = table;
    let mut types = ColumnTypes::default();

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in names {
        let series = df
            .column(&name)
            .map_err(CleaningError::from)?
            .as_materialized_series()
            .clone();
        let classification = classify_column(&series, config);

        match classification.kind {
            ColumnKind::Numeric => {
                if series.dtype() == &DataType::String {
                    match string_to_float_series(&series) {
                        Ok(parsed) => {
                            debug!(
                                column = %name,
                                confidence = classification.confidence,
                                "coerced to numeric"
                            );
                            df.replace(&name, parsed).map_err(CleaningError::from)?;
                            types.numeric.push(name);
                        }
                        Err(e) => {
                            warn!(column = %name, error = %e, "numeric coercion failed, keeping categorical");
                            types.categorical.push(name);
                        }
                    }
                } else {
                    types.numeric.push(name);
                }
            }
            ColumnKind::Datetime => {
                if series.dtype() == &DataType::String {
                    match string_to_datetime_series(&series) {
                        Ok(parsed) => {
                            debug!(
                                column = %name,
                                confidence = classification.confidence,
                                "coerced to datetime"
                            );
                            df.replace(&name, parsed).map_err(CleaningError::from)?;
                            types.datetime.push(name);
                        }
                        Err(e) => {
                            warn!(column = %name, error = %e, "datetime coercion failed, keeping categorical");
                            types.categorical.push(name);
                        }
                    }
                } else {
                    types.datetime.push(name);
                }
            }
            ColumnKind::Categorical => {
                types.categorical.push(name);
            }
        }
    }

    Ok((df, types))
}

/// Derive per-column descriptors for a classified table.
pub fn describe_columns(df: &DataFrame, types: &ColumnTypes) -> Result<Vec<ColumnDescriptor>> {
    let mut descriptors = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();
        let kind = types.kind_of(&name).unwrap_or(ColumnKind::Categorical);
        descriptors.push(ColumnDescriptor {
            name,
            kind,
            missing_count: series.null_count(),
            unique_count: series
                .drop_nulls()
                .n_unique()
                .map_err(CleaningError::from)?,
        });
    }

    Ok(descriptors)
}
