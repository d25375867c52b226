//! Categorical encoding keyed on column cardinality.
//!
//! Low-cardinality columns become one-hot indicator columns (first level
//! dropped), medium-cardinality columns are label encoded, and
//! high-cardinality columns are frequency encoded. Values are compared by
//! their string form so boolean columns encode the same way text does.

use crate::config::CleaningConfig;
use crate::error::Result;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Encodes categorical columns into numeric representations.
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Encode every categorical column in place.
    ///
    /// The strategy for a column is picked from its distinct non-missing
    /// value count: below `cat_threshold` one-hot, below
    /// `high_card_threshold` label, otherwise frequency. Returns the
    /// original names of the columns that were encoded, in table column
    /// order.
    pub fn encode_table(
        df: &mut DataFrame,
        categorical_columns: &[String],
        config: &CleaningConfig,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let ordered: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| categorical_columns.iter().any(|c| c == name))
            .collect();

        let mut encoded = Vec::new();
        for name in ordered {
            let series = df.column(&name)?.as_materialized_series().clone();
            let nunique = series.drop_nulls().n_unique()?;

            if nunique < config.cat_threshold {
                match Self::one_hot_encode(df, &name, &series) {
                    Ok(created) => {
                        processing_steps.push(format!(
                            "One-hot encoded '{}' into {} indicator columns",
                            name, created
                        ));
                    }
                    Err(e) => {
                        warn!(
                            "One-hot encoding failed for '{}' ({}), falling back to label encoding",
                            name, e
                        );
                        Self::label_encode(df, &name, &series)?;
                        processing_steps.push(format!(
                            "Label encoded '{}' after one-hot encoding failed",
                            name
                        ));
                    }
                }
            } else if nunique < config.high_card_threshold {
                Self::label_encode(df, &name, &series)?;
                processing_steps.push(format!(
                    "Label encoded '{}' ({} distinct values)",
                    name, nunique
                ));
            } else {
                Self::frequency_encode(df, &name, &series)?;
                processing_steps.push(format!(
                    "Frequency encoded '{}' ({} distinct values)",
                    name, nunique
                ));
            }

            encoded.push(name);
        }

        Ok(encoded)
    }

    /// Replace a column with one indicator column per distinct value,
    /// skipping the lexically first value. Missing rows get all zeros.
    fn one_hot_encode(df: &mut DataFrame, name: &str, series: &Series) -> Result<usize> {
        let as_string = series.cast(&DataType::String)?;
        let chunked = as_string.str()?;

        let mut distinct: BTreeSet<String> = BTreeSet::new();
        for opt_val in chunked.into_iter() {
            if let Some(val) = opt_val {
                distinct.insert(val.to_string());
            }
        }

        let mut indicators = Vec::new();
        for value in distinct.iter().skip(1) {
            let dummy_name = format!("{}_{}", name, value);
            let bits: Vec<u32> = chunked
                .into_iter()
                .map(|opt_val| u32::from(opt_val == Some(value.as_str())))
                .collect();
            let dummy =
                Series::new(dummy_name.as_str().into(), bits).cast(&DataType::UInt8)?;
            indicators.push(dummy);
        }

        df.drop_in_place(name)?;
        let created = indicators.len();
        for dummy in indicators {
            df.with_column(dummy)?;
        }

        debug!("One-hot encoded '{}' into {} columns", name, created);
        Ok(created)
    }

    /// Replace values with their rank in the sorted distinct set.
    /// Missing values stay missing.
    fn label_encode(df: &mut DataFrame, name: &str, series: &Series) -> Result<()> {
        let as_string = series.cast(&DataType::String)?;
        let chunked = as_string.str()?;

        let mut distinct: BTreeSet<String> = BTreeSet::new();
        for opt_val in chunked.into_iter() {
            if let Some(val) = opt_val {
                distinct.insert(val.to_string());
            }
        }
        let codes: BTreeMap<String, i32> = distinct
            .into_iter()
            .enumerate()
            .map(|(idx, val)| (val, idx as i32))
            .collect();

        let labels: Vec<Option<i32>> = chunked
            .into_iter()
            .map(|opt_val| opt_val.and_then(|val| codes.get(val).copied()))
            .collect();

        df.replace(name, Series::new(name.into(), labels))?;
        Ok(())
    }

    /// Replace values with their share of the non-missing rows.
    /// Missing values become 0.0.
    fn frequency_encode(df: &mut DataFrame, name: &str, series: &Series) -> Result<()> {
        let as_string = series.cast(&DataType::String)?;
        let chunked = as_string.str()?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for opt_val in chunked.into_iter() {
            if let Some(val) = opt_val {
                *counts.entry(val.to_string()).or_insert(0) += 1;
            }
        }
        let non_missing = counts.values().sum::<usize>() as f64;

        let frequencies: Vec<f64> = chunked
            .into_iter()
            .map(|opt_val| match opt_val {
                Some(val) => counts
                    .get(val)
                    .map(|count| *count as f64 / non_missing)
                    .unwrap_or(0.0),
                None => 0.0,
            })
            .collect();

        df.replace(name, Series::new(name.into(), frequencies))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(cat: usize, high: usize) -> CleaningConfig {
        CleaningConfig {
            cat_threshold: cat,
            high_card_threshold: high,
            ..CleaningConfig::default()
        }
    }

    // ==================== one-hot tests ====================

    #[test]
    fn test_one_hot_drops_first_level_and_original() {
        let mut df = df![
            "dept" => ["HR", "IT", "HR", "Sales"],
            "age" => [25, 30, 35, 40],
        ]
        .unwrap();
        let mut steps = vec![];

        let encoded = CategoricalEncoder::encode_table(
            &mut df,
            &["dept".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        assert_eq!(encoded, vec!["dept".to_string()]);
        assert!(df.column("dept").is_err());

        let it = df.column("dept_IT").unwrap();
        assert_eq!(it.dtype(), &DataType::UInt8);
        let it_vals: Vec<u8> = it.u8().unwrap().into_iter().flatten().collect();
        assert_eq!(it_vals, vec![0, 1, 0, 0]);

        let sales_vals: Vec<u8> = df
            .column("dept_Sales")
            .unwrap()
            .u8()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(sales_vals, vec![0, 0, 0, 1]);

        // Lexically first level "HR" carries no indicator column.
        assert!(df.column("dept_HR").is_err());
    }

    #[test]
    fn test_one_hot_missing_rows_get_all_zeros() {
        let mut df = df![
            "color" => [Some("blue"), None, Some("red")],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["color".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        let red_vals: Vec<u8> = df
            .column("color_red")
            .unwrap()
            .u8()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(red_vals, vec![0, 0, 1]);
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_one_hot_k_values_yield_k_minus_one_columns() {
        let mut df = df![
            "grade" => ["a", "b", "c", "d", "a", "b"],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["grade".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        assert_eq!(df.width(), 3);
        for suffix in ["b", "c", "d"] {
            assert!(df.column(&format!("grade_{}", suffix)).is_ok());
        }
    }

    #[test]
    fn test_one_hot_boolean_column() {
        let mut df = df![
            "active" => [true, false, true],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["active".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        let vals: Vec<u8> = df
            .column("active_true")
            .unwrap()
            .u8()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(vals, vec![1, 0, 1]);
    }

    // ==================== label tests ====================

    #[test]
    fn test_label_encode_sorted_codes() {
        let mut df = df![
            "status" => ["A", "B", "A", "C", "A", "B"],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["status".to_string()],
            &config_with(2, 1000),
            &mut steps,
        )
        .unwrap();

        let col = df.column("status").unwrap();
        assert_eq!(col.dtype(), &DataType::Int32);
        let vals: Vec<i32> = col.i32().unwrap().into_iter().flatten().collect();
        assert_eq!(vals, vec![0, 1, 0, 2, 0, 1]);
        assert!(steps.iter().any(|s| s.contains("Label encoded 'status'")));
    }

    #[test]
    fn test_label_encode_preserves_missing() {
        let mut df = df![
            "status" => [Some("b"), None, Some("a")],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["status".to_string()],
            &config_with(1, 1000),
            &mut steps,
        )
        .unwrap();

        let col = df.column("status").unwrap();
        let vals: Vec<Option<i32>> = col.i32().unwrap().into_iter().collect();
        assert_eq!(vals, vec![Some(1), None, Some(0)]);
    }

    // ==================== frequency tests ====================

    #[test]
    fn test_frequency_encode_shares_of_non_missing() {
        let mut df = df![
            "city" => [Some("x"), Some("x"), None, Some("y")],
        ]
        .unwrap();
        let mut steps = vec![];

        CategoricalEncoder::encode_table(
            &mut df,
            &["city".to_string()],
            &config_with(1, 2),
            &mut steps,
        )
        .unwrap();

        let col = df.column("city").unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        let vals: Vec<f64> = col.f64().unwrap().into_iter().flatten().collect();
        assert_eq!(vals.len(), 4);
        assert!((vals[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((vals[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(vals[2], 0.0);
        assert!((vals[3] - 1.0 / 3.0).abs() < 1e-12);
    }

    // ==================== gating tests ====================

    #[test]
    fn test_encode_table_cardinality_gates() {
        let mut df = df![
            "low" => ["a", "b", "c"],
            "mid" => ["p", "q", "r"],
        ]
        .unwrap();
        let mut steps = vec![];

        // cat = 2: both columns have 3 distinct values, so both label encode.
        CategoricalEncoder::encode_table(
            &mut df,
            &["low".to_string(), "mid".to_string()],
            &config_with(2, 1000),
            &mut steps,
        )
        .unwrap();

        assert_eq!(df.column("low").unwrap().dtype(), &DataType::Int32);
        assert_eq!(df.column("mid").unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn test_encode_table_returns_names_in_table_order() {
        let mut df = df![
            "b_col" => ["x", "y", "x"],
            "a_col" => ["m", "n", "m"],
        ]
        .unwrap();
        let mut steps = vec![];

        // Request order is reversed relative to the table.
        let encoded = CategoricalEncoder::encode_table(
            &mut df,
            &["a_col".to_string(), "b_col".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        assert_eq!(encoded, vec!["b_col".to_string(), "a_col".to_string()]);
    }

    #[test]
    fn test_encode_table_skips_non_categorical_columns() {
        let mut df = df![
            "num" => [1.0, 2.0, 3.0],
            "cat" => ["a", "b", "a"],
        ]
        .unwrap();
        let mut steps = vec![];

        let encoded = CategoricalEncoder::encode_table(
            &mut df,
            &["cat".to_string()],
            &CleaningConfig::default(),
            &mut steps,
        )
        .unwrap();

        assert_eq!(encoded, vec!["cat".to_string()]);
        assert_eq!(df.column("num").unwrap().dtype(), &DataType::Float64);
    }
}
