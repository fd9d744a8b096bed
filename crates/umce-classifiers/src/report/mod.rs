//! Evaluation reports: raw per-split results, their per-dataset averages and
//! the flat `(dataset, model, metric, value, method)` table used for
//! comparisons across methods.
mod table;

pub use table::{rank, read_rows_csv, write_rows_csv, FlatRow, DEFAULT_FLAT_METRICS};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::{ClassifierFamily, Method};
use crate::metrics::MetricVector;
use crate::outcome::{FamilyOutcome, MethodResults};

/// All split outcomes of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub method: Method,
    pub generated_at: DateTime<Utc>,
    pub results: MethodResults,
}

impl EvaluationReport {
    pub fn new(method: Method, results: MethodResults) -> Self {
        Self {
            method,
            generated_at: Utc::now(),
            results,
        }
    }

    /// Mean metric vector per dataset and family over the scored splits.
    pub fn average(&self) -> AveragedReport {
        let results = self
            .results
            .iter()
            .map(|(dataset, families)| {
                let averaged = families
                    .iter()
                    .map(|(&family, outcomes)| (family, AveragedEntry::from_outcomes(outcomes)))
                    .collect();
                (dataset.clone(), averaged)
            })
            .collect();

        AveragedReport {
            method: self.method,
            generated_at: self.generated_at,
            results,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_json(self, path.as_ref())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path.as_ref())
    }
}

/// Per dataset/family averages for one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedReport {
    pub method: Method,
    pub generated_at: DateTime<Utc>,
    pub results: BTreeMap<String, BTreeMap<ClassifierFamily, AveragedEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedEntry {
    pub scored_splits: usize,
    pub skipped_splits: usize,
    /// `None` when no split was scored.
    pub metrics: Option<MetricVector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_causes: Vec<String>,
}

impl AveragedEntry {
    pub fn from_outcomes(outcomes: &[FamilyOutcome]) -> Self {
        let scored: Vec<MetricVector> = outcomes.iter().filter_map(|o| o.metrics().copied()).collect();
        let skip_causes: Vec<String> = outcomes
            .iter()
            .filter_map(|o| match o {
                FamilyOutcome::Skipped { stage, cause } => Some(format!("{}: {}", stage, cause)),
                FamilyOutcome::Scored { .. } => None,
            })
            .collect();

        Self {
            scored_splits: scored.len(),
            skipped_splits: skip_causes.len(),
            metrics: MetricVector::mean(&scored),
            skip_causes,
        }
    }
}

impl AveragedReport {
    /// Flatten to one row per (dataset, family, metric), restricted to
    /// `metrics`. Entries without a scored split produce no rows.
    pub fn flatten(&self, metrics: &[&str]) -> Vec<FlatRow> {
        let mut rows = Vec::new();
        for (dataset, families) in &self.results {
            for (family, entry) in families {
                let Some(vector) = entry.metrics.as_ref() else {
                    continue;
                };
                for &metric in metrics {
                    if let Some(value) = vector.get(metric) {
                        rows.push(FlatRow {
                            dataset: dataset.clone(),
                            model: family.as_str().to_string(),
                            metric: metric.to_string(),
                            value,
                            method: self.method.as_str().to_string(),
                        });
                    }
                }
            }
        }
        rows
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_json(self, path.as_ref())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path.as_ref())
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::score;
    use crate::outcome::RunStage;
    use approx::assert_abs_diff_eq;

    pub(crate) fn sample_report() -> EvaluationReport {
        let good = score(&[1, 0, 0, 0], &[1, 0, 0, 0]).unwrap();
        let half = score(&[1, 0, 0, 0], &[0, 0, 0, 0]).unwrap();
        let mut results = MethodResults::new();
        let families = results.entry("ecoli1".to_string()).or_default();
        families.insert(
            ClassifierFamily::DecisionTree,
            vec![
                FamilyOutcome::Scored {
                    metrics: good,
                    members: 3,
                    skipped_members: vec![],
                },
                FamilyOutcome::Scored {
                    metrics: half,
                    members: 3,
                    skipped_members: vec![],
                },
            ],
        );
        families.insert(
            ClassifierFamily::NaiveBayes,
            vec![FamilyOutcome::skipped(RunStage::TrainEnsemble, "boom")],
        );
        EvaluationReport::new(Method::Umce, results)
    }

    #[test]
    fn test_average_over_scored_splits() {
        let averaged = sample_report().average();
        let dt = &averaged.results["ecoli1"][&ClassifierFamily::DecisionTree];
        assert_eq!(dt.scored_splits, 2);
        assert_abs_diff_eq!(dt.metrics.unwrap().balanced_accuracy, 0.75);

        let nb = &averaged.results["ecoli1"][&ClassifierFamily::NaiveBayes];
        assert!(nb.metrics.is_none());
        assert_eq!(nb.skipped_splits, 1);
        assert_eq!(nb.skip_causes, vec!["train_ensemble: boom".to_string()]);
    }

    #[test]
    fn test_flatten_keeps_requested_metrics_only() {
        let rows = sample_report().average().flatten(&DEFAULT_FLAT_METRICS);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.model == "decision_tree" && r.method == "umce"));
        let metrics: Vec<&str> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["f1_score", "balanced_accuracy", "auc_roc"]);
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("umce.json");
        let report = sample_report();
        report.write_json(&path).unwrap();
        assert_eq!(EvaluationReport::read_json(&path).unwrap(), report);
    }
}
