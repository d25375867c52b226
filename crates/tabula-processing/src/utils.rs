//! Shared utilities for the cleaning and profiling pipeline.
//!
//! Small helpers used across multiple stages: dtype checks, finite-safe
//! parsing, order statistics, null filling, and column-name hygiene.

use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

// =============================================================================
// Parsing and Finiteness
// =============================================================================

/// Try to parse a string as a finite f64.
///
/// Leading/trailing whitespace is ignored. Values that parse to NaN or
/// infinity do not count as numeric.
pub fn parse_finite_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert a float to `Some(value)` only when it is finite.
///
/// Profile records must never carry NaN or infinity; `None` is the
/// explicit "undefined" marker.
#[inline]
pub fn finite_or_none(value: f64) -> Option<f64> {
    if value.is_finite() { Some(value) } else { None }
}

// =============================================================================
// Order Statistics
// =============================================================================

/// Percentile of a sorted slice using linear interpolation between order
/// statistics (rank = p * (n - 1)).
///
/// `p` is a fraction in [0, 1]. Returns None for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Collect the non-null values of a Series as finite f64s, sorted ascending.
pub fn sorted_finite_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let mut values = collect_finite_values(series)?;
    values.sort_by(|a, b| a.total_cmp(b));
    Ok(values)
}

/// Collect the non-null values of a Series as f64, dropping non-finite ones.
pub fn collect_finite_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    Ok(values)
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Calculate the mode (most frequent value) of a string-convertible Series.
///
/// Ties are broken by the lexically smallest value so repeated runs over the
/// same data give the same answer.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    let str_series = non_null.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: BTreeMap<String, usize> = BTreeMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val.to_string()).or_insert(0) += 1;
    }

    // Highest count wins; on equal counts the lexically smaller value wins.
    value_counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then(b_val.cmp(a_val))
        })
        .map(|(val, _)| val)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let casted = series.cast(&DataType::Float64)?;
    let filled = casted
        .f64()?
        .into_iter()
        .map(|opt| Some(opt.unwrap_or(fill_value)))
        .collect::<Vec<Option<f64>>>();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let casted = series.cast(&DataType::String)?;
    let filled = casted
        .str()?
        .into_iter()
        .map(|opt| Some(opt.map(|s| s.to_string()).unwrap_or_else(|| fill_value.to_string())))
        .collect::<Vec<Option<String>>>();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Column Name Hygiene
// =============================================================================

/// Normalize a column name: trim, lowercase, spaces to underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Normalize a full set of column names, uniquifying collisions.
///
/// Repeated names (after normalization) get `_2`, `_3`, ... suffixes in
/// left-to-right order. The table layer rejects duplicate names outright,
/// so collisions must be resolved here.
pub fn normalize_column_names(names: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let normalized = normalize_column_name(name);
        let count = seen.entry(normalized.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            result.push(normalized);
        } else {
            result.push(format!("{}_{}", normalized, count));
        }
    }

    result
}

/// Check whether a column name is identifier-like: non-empty, first char
/// alphabetic or underscore, rest alphanumeric or underscore.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_datetime_dtype() {
        assert!(is_datetime_dtype(&DataType::Date));
        assert!(is_datetime_dtype(&DataType::Datetime(
            TimeUnit::Milliseconds,
            None
        )));
        assert!(!is_datetime_dtype(&DataType::String));
    }

    #[test]
    fn test_parse_finite_f64() {
        assert_eq!(parse_finite_f64("42"), Some(42.0));
        assert_eq!(parse_finite_f64("  3.14  "), Some(3.14));
        assert_eq!(parse_finite_f64("-100"), Some(-100.0));
        assert_eq!(parse_finite_f64("1e3"), Some(1000.0));
        assert_eq!(parse_finite_f64(""), None);
        assert_eq!(parse_finite_f64("hello"), None);
        assert_eq!(parse_finite_f64("NaN"), None);
        assert_eq!(parse_finite_f64("inf"), None);
    }

    #[test]
    fn test_finite_or_none() {
        assert_eq!(finite_or_none(1.5), Some(1.5));
        assert_eq!(finite_or_none(f64::NAN), None);
        assert_eq!(finite_or_none(f64::INFINITY), None);
        assert_eq!(finite_or_none(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_percentile_sorted_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 1000.0];
        // rank = 0.25 * 4 = 1.0 -> exactly the second value
        assert_eq!(percentile_sorted(&values, 0.25), Some(2.0));
        assert_eq!(percentile_sorted(&values, 0.75), Some(4.0));
        assert_eq!(percentile_sorted(&values, 0.5), Some(3.0));
        // rank = 0.1 * 4 = 0.4 -> between 1 and 2
        assert_eq!(percentile_sorted(&values, 0.1), Some(1.4));
    }

    #[test]
    fn test_percentile_sorted_edges() {
        assert_eq!(percentile_sorted(&[], 0.5), None);
        assert_eq!(percentile_sorted(&[7.0], 0.25), Some(7.0));
        let values = [1.0, 2.0];
        assert_eq!(percentile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(percentile_sorted(&values, 1.0), Some(2.0));
        assert_eq!(percentile_sorted(&values, 0.5), Some(1.5));
    }

    #[test]
    fn test_string_mode_basic() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_breaks_lexically() {
        let series = Series::new("test".into(), &["b", "a", "b", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[None::<&str>, None]);
        assert_eq!(string_mode(&series), None);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 2.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("x"), None, Some("y")]);
        let filled = fill_string_nulls(&series, "Unknown").unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().to_string(), "\"Unknown\"");
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  First Name "), "first_name");
        assert_eq!(normalize_column_name("AGE"), "age");
        assert_eq!(normalize_column_name("unit price usd"), "unit_price_usd");
    }

    #[test]
    fn test_normalize_column_names_uniquifies() {
        let names = vec![
            "Age".to_string(),
            "age ".to_string(),
            " AGE".to_string(),
            "name".to_string(),
        ];
        let normalized = normalize_column_names(&names);
        assert_eq!(normalized, vec!["age", "age_2", "age_3", "name"]);
    }

    #[test]
    fn test_is_identifier_name() {
        assert!(is_identifier_name("age"));
        assert!(is_identifier_name("_hidden"));
        assert!(is_identifier_name("col_2"));
        assert!(!is_identifier_name("2col"));
        assert!(!is_identifier_name("first name"));
        assert!(!is_identifier_name(""));
        assert!(!is_identifier_name("price-usd"));
    }

    #[test]
    fn test_collect_finite_values_drops_nulls() {
        let series = Series::new("test".into(), &[Some(2.0), None, Some(1.0)]);
        let values = sorted_finite_values(&series).unwrap();
        assert_eq!(values, vec![1.0, 2.0]);
    }
}
