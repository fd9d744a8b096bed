//! `umce flatten`: merge averaged reports into one long-format table.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use umce_classifiers::report::{AveragedReport, FlatRow};

use crate::util::method_label;

/// Every `average_*.json` in `dir`, sorted by name.
pub fn averaged_report_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read results directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().map_or(false, |e| e == "json")
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("average_"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Flatten every averaged report in `dir`, labelling rows with the file
/// name's method suffix.
pub fn flatten_results(dir: &Path, metrics: &[&str]) -> Result<Vec<FlatRow>> {
    let paths = averaged_report_paths(dir)?;
    if paths.is_empty() {
        anyhow::bail!("No average_*.json files in {}", dir.display());
    }

    let mut rows = Vec::new();
    for path in paths {
        let report = AveragedReport::read_json(&path)?;
        let label = method_label(&path).unwrap_or_else(|| report.method.as_str().to_string());
        log::debug!("Flattening {} as '{}'", path.display(), label);
        rows.extend(report.flatten(metrics).into_iter().map(|mut row| {
            row.method = label.clone();
            row
        }));
    }
    Ok(rows)
}
