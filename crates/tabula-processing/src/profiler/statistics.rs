//! Statistical analysis functions for column profiling.

use crate::types::{NumericSummary, ValueCount};
use crate::utils;
use anyhow::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Second central moments at or below this are treated as zero variance,
/// leaving skewness and kurtosis undefined.
const MOMENT_EPSILON: f64 = 1e-12;

/// Compute the full numeric statistics record for one column.
///
/// Every field is `None` when the column has no usable values. Standard
/// deviation and variance use the sample convention (ddof = 1); skewness and
/// kurtosis use population central moments (g1 and excess g2).
pub(crate) fn numeric_summary(series: &Series) -> Result<NumericSummary> {
    let values = utils::collect_finite_values(series)?;
    if values.is_empty() {
        return Ok(NumericSummary::default());
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let (variance, std) = if values.len() > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (Some(var), Some(var.sqrt()))
    } else {
        (None, None)
    };

    let p10 = utils::percentile_sorted(&sorted, 0.10);
    let p25 = utils::percentile_sorted(&sorted, 0.25);
    let p50 = utils::percentile_sorted(&sorted, 0.50);
    let p75 = utils::percentile_sorted(&sorted, 0.75);
    let p90 = utils::percentile_sorted(&sorted, 0.90);
    let iqr = match (p25, p75) {
        (Some(lo), Some(hi)) => Some(hi - lo),
        _ => None,
    };

    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let (skewness, kurtosis) = if m2 > MOMENT_EPSILON {
        let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
        let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n;
        (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
    } else {
        (None, None)
    };

    Ok(NumericSummary {
        mean: utils::finite_or_none(mean),
        median: p50,
        std: std.and_then(utils::finite_or_none),
        variance: variance.and_then(utils::finite_or_none),
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        p10,
        p25,
        p50,
        p75,
        p90,
        iqr: iqr.and_then(utils::finite_or_none),
        skewness: skewness.and_then(utils::finite_or_none),
        kurtosis: kurtosis.and_then(utils::finite_or_none),
        modes: numeric_modes(&values),
    })
}

/// Every value attaining the maximum frequency, ascending.
pub(crate) fn numeric_modes(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut runs: Vec<(f64, usize)> = Vec::new();
    for value in sorted {
        match runs.last_mut() {
            Some((run_value, count)) if *run_value == value => *count += 1,
            _ => runs.push((value, 1)),
        }
    }

    let max_count = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    runs.into_iter()
        .filter(|(_, count)| *count == max_count)
        .map(|(value, _)| value)
        .collect()
}

/// Top `k` most frequent stringified values, ordered by count descending
/// then value ascending.
pub(crate) fn top_values(series: &Series, k: usize) -> Result<Vec<ValueCount>> {
    let as_string = series.cast(&DataType::String)?;
    let chunked = as_string.str()?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for opt_val in chunked.into_iter() {
        if let Some(val) = opt_val {
            *counts.entry(val.to_string()).or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    pairs.truncate(k);

    Ok(pairs
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect())
}

/// Pairwise-complete Pearson correlation between two columns.
///
/// Only rows where both values are present and finite contribute. `None`
/// when fewer than two such rows exist or either side has zero variance.
pub(crate) fn pearson_correlation(a: &Series, b: &Series) -> Result<Option<f64>> {
    let a_float = a.cast(&DataType::Float64)?;
    let b_float = b.cast(&DataType::Float64)?;
    let a_chunked = a_float.f64()?;
    let b_chunked = b_float.f64()?;

    let mut pairs: Vec<(f64, f64)> = Vec::new();
    for (left, right) in a_chunked.into_iter().zip(b_chunked.into_iter()) {
        if let (Some(x), Some(y)) = (left, right)
            && x.is_finite()
            && y.is_finite()
        {
            pairs.push((x, y));
        }
    }

    if pairs.len() < 2 {
        return Ok(None);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x <= 0.0 || variance_y <= 0.0 {
        return Ok(None);
    }

    Ok(utils::finite_or_none(
        covariance / (variance_x.sqrt() * variance_y.sqrt()),
    ))
}
