//! `umce rank`: order classifier families per dataset by one metric.
use std::path::Path;

use anyhow::Result;

use umce_classifiers::report::{rank, AveragedReport};

use crate::commands::flatten::averaged_report_paths;

/// Ranking text for every averaged report in `dir`.
pub fn rank_results(dir: &Path, metric: &str) -> Result<String> {
    let mut out = String::new();
    for path in averaged_report_paths(dir)? {
        let report = AveragedReport::read_json(&path)?;
        out.push_str(&format!("== {} ({}) ==\n", report.method, metric));
        for (dataset, families) in rank(&report, metric)? {
            let entries: Vec<String> = families
                .iter()
                .map(|(family, value)| format!("{}={:.4}", family, value))
                .collect();
            out.push_str(&format!("{}: {}\n", dataset, entries.join(" > ")));
        }
    }
    Ok(out)
}
