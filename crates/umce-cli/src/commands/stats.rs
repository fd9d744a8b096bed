//! `umce stats`: descriptive statistics and ANOVA over a flattened table.
use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use umce_classifiers::report::read_rows_csv;
use umce_classifiers::stats::{describe, one_way_anova, GroupBy};

use crate::util::validate_tsv_or_csv_file;

pub fn stats_report(path: &Path, metric: Option<&str>, group_by: GroupBy) -> Result<String> {
    validate_tsv_or_csv_file(path)?;
    let rows: Vec<_> = read_rows_csv(path)?
        .into_iter()
        .filter(|r| metric.map_or(true, |m| r.metric == m))
        .collect();
    if rows.is_empty() {
        anyhow::bail!("No rows to analyse in {}", path.display());
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<24}{:>7}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "group", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for s in describe(&rows, group_by) {
        writeln!(
            out,
            "{:<24}{:>7}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}",
            s.group, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        )?;
    }
    writeln!(out)?;

    match one_way_anova(&rows, group_by) {
        Ok(table) => writeln!(out, "{}", table)?,
        Err(e) => {
            log::warn!("ANOVA skipped: {:#}", e);
            writeln!(out, "ANOVA not available: {}", e)?;
        }
    }
    Ok(out)
}
