use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::report::AveragedReport;

/// Metrics kept when flattening averaged reports.
pub const DEFAULT_FLAT_METRICS: [&str; 3] = ["f1_score", "balanced_accuracy", "auc_roc"];

/// One `(dataset, model, metric, value, method)` observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub dataset: String,
    pub model: String,
    pub metric: String,
    pub value: f64,
    pub method: String,
}

pub fn write_rows_csv<P: AsRef<Path>>(path: P, rows: &[FlatRow]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_rows_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<FlatRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Invalid row {} in {}", i + 1, path.display())))
        .collect()
}

/// Per dataset, `(family, value)` sorted by `metric` descending. Entries
/// with no scored split are left out.
pub fn rank(report: &AveragedReport, metric: &str) -> anyhow::Result<BTreeMap<String, Vec<(String, f64)>>> {
    let mut ranking = BTreeMap::new();
    for (dataset, families) in &report.results {
        let mut scored = Vec::new();
        for (family, entry) in families {
            if let Some(vector) = &entry.metrics {
                let value = vector
                    .get(metric)
                    .with_context(|| format!("Unknown metric '{}'", metric))?;
                scored.push((family.as_str().to_string(), value));
            }
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking.insert(dataset.clone(), scored);
    }
    Ok(ranking)
}
