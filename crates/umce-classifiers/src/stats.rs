//! Descriptive statistics and one-way ANOVA over flattened metric rows.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::statistics::Statistics;

use crate::report::FlatRow;

/// Column of a [`FlatRow`] used to form groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Model,
    Method,
    Dataset,
}

impl GroupBy {
    fn key<'a>(&self, row: &'a FlatRow) -> &'a str {
        match self {
            GroupBy::Model => &row.model,
            GroupBy::Method => &row.method,
            GroupBy::Dataset => &row.dataset,
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(GroupBy::Model),
            "method" => Ok(GroupBy::Method),
            "dataset" => Ok(GroupBy::Dataset),
            other => Err(format!(
                "Unsupported grouping: {}. Valid options are: model, method, dataset",
                other
            )),
        }
    }
}

/// Values of `rows` grouped by `group_by`, groups in name order.
pub fn group_values(rows: &[FlatRow], group_by: GroupBy) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(group_by.key(row).to_string())
            .or_default()
            .push(row.value);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, NaN for a single observation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Count, mean, std, min, quartiles and max of the values per group.
pub fn describe(rows: &[FlatRow], group_by: GroupBy) -> Vec<GroupSummary> {
    group_values(rows, group_by)
        .into_iter()
        .map(|(group, mut values)| {
            values.sort_by(f64::total_cmp);
            GroupSummary {
                count: values.len(),
                mean: values.iter().mean(),
                std: values.iter().std_dev(),
                min: values[0],
                q25: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q75: quantile(&values, 0.75),
                max: values[values.len() - 1],
                group,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaRow {
    pub sum_sq: f64,
    pub df: f64,
    pub mean_sq: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    pub group_by: GroupBy,
    pub between: AnovaRow,
    pub within: AnovaRow,
    pub f_statistic: f64,
    pub p_value: f64,
}

impl fmt::Display for AnovaTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:<12}{:>14}{:>8}{:>14}{:>12}{:>12}", "", "sum_sq", "df", "mean_sq", "F", "PR(>F)")?;
        writeln!(
            f,
            "{:<12}{:>14.6}{:>8}{:>14.6}{:>12.4}{:>12.4e}",
            format!("{:?}", self.group_by).to_lowercase(),
            self.between.sum_sq,
            self.between.df,
            self.between.mean_sq,
            self.f_statistic,
            self.p_value
        )?;
        write!(
            f,
            "{:<12}{:>14.6}{:>8}{:>14.6}",
            "residual", self.within.sum_sq, self.within.df, self.within.mean_sq
        )
    }
}

/// One-way analysis of variance of `value` across the groups of `group_by`.
pub fn one_way_anova(rows: &[FlatRow], group_by: GroupBy) -> anyhow::Result<AnovaTable> {
    let groups = group_values(rows, group_by);
    let n_groups = groups.len();
    let n_total: usize = groups.values().map(Vec::len).sum();

    if n_groups < 2 {
        anyhow::bail!("ANOVA needs at least two groups, got {}", n_groups);
    }
    if n_total <= n_groups {
        anyhow::bail!(
            "ANOVA needs more observations ({}) than groups ({})",
            n_total,
            n_groups
        );
    }

    let grand_mean = groups.values().flatten().sum::<f64>() / n_total as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for values in groups.values() {
        let mean = values.iter().mean();
        ss_between += values.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }

    let df_between = (n_groups - 1) as f64;
    let df_within = (n_total - n_groups) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;
    let f_statistic = ms_between / ms_within;

    let f_dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| anyhow!("Invalid F distribution: {}", e))?;
    // F is NaN when every value is identical, infinite when groups are
    // internally constant but differ from each other.
    let p_value = if f_statistic.is_nan() {
        f64::NAN
    } else if f_statistic.is_infinite() {
        0.0
    } else {
        1.0 - f_dist.cdf(f_statistic)
    };

    Ok(AnovaTable {
        group_by,
        between: AnovaRow {
            sum_sq: ss_between,
            df: df_between,
            mean_sq: ms_between,
        },
        within: AnovaRow {
            sum_sq: ss_within,
            df: df_within,
            mean_sq: ms_within,
        },
        f_statistic,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rows(data: &[(&str, f64)]) -> Vec<FlatRow> {
        data.iter()
            .map(|&(model, value)| FlatRow {
                dataset: "d".into(),
                model: model.into(),
                metric: "balanced_accuracy".into(),
                value,
                method: "umce".into(),
            })
            .collect()
    }

    #[test]
    fn test_describe_quartiles() {
        let summary = describe(&rows(&[("rf", 4.0), ("rf", 1.0), ("rf", 3.0), ("rf", 2.0)]), GroupBy::Model);
        assert_eq!(summary.len(), 1);
        let s = &summary[0];
        assert_eq!(s.count, 4);
        assert_abs_diff_eq!(s.mean, 2.5);
        assert_abs_diff_eq!(s.std, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(s.q25, 1.75);
        assert_abs_diff_eq!(s.median, 2.5);
        assert_abs_diff_eq!(s.q75, 3.25);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn test_anova_known_table() {
        // Group means 2 and 5, grand mean 3.5.
        let data = rows(&[("a", 1.0), ("a", 2.0), ("a", 3.0), ("b", 4.0), ("b", 5.0), ("b", 6.0)]);
        let table = one_way_anova(&data, GroupBy::Model).unwrap();

        assert_abs_diff_eq!(table.between.sum_sq, 13.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.within.sum_sq, 4.0, epsilon = 1e-12);
        assert_eq!(table.between.df, 1.0);
        assert_eq!(table.within.df, 4.0);
        assert_abs_diff_eq!(table.f_statistic, 13.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.p_value, 0.021311641128756714, epsilon = 1e-6);
    }

    #[test]
    fn test_anova_needs_two_groups() {
        assert!(one_way_anova(&rows(&[("a", 1.0), ("a", 2.0)]), GroupBy::Model).is_err());
        assert!(one_way_anova(&rows(&[("a", 1.0), ("b", 2.0)]), GroupBy::Model).is_err());
    }
}
