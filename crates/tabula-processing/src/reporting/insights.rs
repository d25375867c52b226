use crate::types::{ColumnKind, ColumnProfile, Insight, Profile};

/// |r| threshold above which a correlation is worth narrating.
const STRONG_CORRELATION: f64 = 0.7;

/// |skew| threshold above which a distribution is called anomalous.
const STRONG_SKEW: f64 = 2.0;

/// Templated narrative findings derived from a [`Profile`].
///
/// Output is fully deterministic: fixed finding order, fixed templates,
/// no randomness and no external calls.
pub struct InsightGenerator;

impl InsightGenerator {
    /// Generate the ordered finding list for a profile.
    pub fn generate(profile: &Profile) -> Vec<Insight> {
        let mut insights = vec![Self::snapshot(profile)];
        if let Some(insight) = Self::key_relationships(profile) {
            insights.push(insight);
        }
        if let Some(insight) = Self::missing_data(profile) {
            insights.push(insight);
        }
        if let Some(insight) = Self::distribution_anomalies(profile) {
            insights.push(insight);
        }
        insights
    }

    fn snapshot(profile: &Profile) -> Insight {
        let (rows, cols) = profile.shape;
        Insight {
            title: "Dataset Snapshot".to_string(),
            content: format!(
                "The dataset contains {} rows and {} columns. \
                 It has a Data Quality Score of {:.1}/100.",
                rows, cols, profile.quality_score
            ),
        }
    }

    /// Strong correlations over unordered column pairs, at most 5.
    fn key_relationships(profile: &Profile) -> Option<Insight> {
        if profile.correlation.is_empty() {
            return None;
        }
        let mut findings = Vec::new();
        for (first, row) in &profile.correlation {
            for (second, r) in row {
                // Each unordered pair is visited once; name order is
                // ascending because the matrix is a BTreeMap.
                if second <= first {
                    continue;
                }
                if *r > STRONG_CORRELATION {
                    findings.push(format!(
                        "- Strong positive relation between {} and {} ({})",
                        first, second, r
                    ));
                } else if *r < -STRONG_CORRELATION {
                    findings.push(format!(
                        "- Strong negative relation between {} and {} ({})",
                        first, second, r
                    ));
                }
            }
        }
        if findings.is_empty() {
            return None;
        }
        findings.truncate(5);
        Some(Insight {
            title: "Key Relationships".to_string(),
            content: findings.join("\n"),
        })
    }

    /// Top 3 columns by missing count, with their missing percentage.
    fn missing_data(profile: &Profile) -> Option<Insight> {
        let (rows, _) = profile.shape;
        let mut missing: Vec<&ColumnProfile> = profile
            .columns
            .iter()
            .filter(|c| c.missing_count > 0)
            .collect();
        if missing.is_empty() {
            return None;
        }
        // Stable sort keeps column order among ties.
        missing.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
        missing.truncate(3);

        let mut lines = vec!["Key columns with specific missing data concerns:".to_string()];
        for column in missing {
            let pct = if rows > 0 {
                column.missing_count as f64 / rows as f64 * 100.0
            } else {
                0.0
            };
            lines.push(format!("- {}: {:.1}% missing", column.name, pct));
        }
        Some(Insight {
            title: "Data Quality Alerts".to_string(),
            content: lines.join("\n"),
        })
    }

    /// Up to 3 numeric columns with |skew| > 2, with direction.
    fn distribution_anomalies(profile: &Profile) -> Option<Insight> {
        let skewed: Vec<(&str, f64)> = profile
            .columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .filter_map(|c| {
                let skew = c.numeric.as_ref()?.skewness?;
                (skew.abs() > STRONG_SKEW).then_some((c.name.as_str(), skew))
            })
            .take(3)
            .collect();
        if skewed.is_empty() {
            return None;
        }
        let mut lines = vec!["Significant skewness detected in distributions:".to_string()];
        for (name, skew) in skewed {
            let direction = if skew > 0.0 {
                "right (positive)"
            } else {
                "left (negative)"
            };
            lines.push(format!("- {} is skewed to the {}.", name, direction));
        }
        Some(Insight {
            title: "Distribution Anomalies".to_string(),
            content: lines.join("\n"),
        })
    }
}
