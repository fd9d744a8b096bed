use anyhow::Result;
use std::path::{Path, PathBuf};

use umce_classifiers::config::Method;

pub fn validate_tsv_or_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path.display()),
    }

    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    Ok(())
}

pub fn validate_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Directory does not exist: {}", path.display());
    }
    Ok(())
}

/// `<dir>/<method>.json`
pub fn report_path(dir: &Path, method: Method) -> PathBuf {
    dir.join(format!("{}.json", method.as_str()))
}

/// `<dir>/average_<method>.json`
pub fn average_path(dir: &Path, method: Method) -> PathBuf {
    dir.join(format!("average_{}.json", method.as_str()))
}

/// Method label of an averaged report file: the stem suffix after the last
/// `_`, so `average_random_undersampling.json` yields `undersampling`.
pub fn method_label(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_labels() {
        let dir = Path::new("out");
        assert_eq!(report_path(dir, Method::Smote), PathBuf::from("out/smote.json"));
        let avg = average_path(dir, Method::RandomUndersampling);
        assert_eq!(avg, PathBuf::from("out/average_random_undersampling.json"));
        assert_eq!(method_label(&avg).as_deref(), Some("undersampling"));
        assert_eq!(method_label(Path::new("average_umce.json")).as_deref(), Some("umce"));
    }

    #[test]
    fn test_validate_tsv_or_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("rows.csv");
        std::fs::write(&csv, "a\n").unwrap();
        assert!(validate_tsv_or_csv_file(&csv).is_ok());
        assert!(validate_tsv_or_csv_file(&dir.path().join("missing.csv")).is_err());
        assert!(validate_tsv_or_csv_file(&dir.path().join("rows.json")).is_err());
        assert!(validate_dir(dir.path()).is_ok());
    }
}
