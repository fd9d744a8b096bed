//! `umce evaluate`: run the method sweep and write the reports.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use umce_classifiers::config::{EvaluationConfig, Method};
use umce_classifiers::evaluation::evaluate;
use umce_classifiers::io::{DatasetRepository, TableReaderConfig};

use crate::util::{average_path, report_path, validate_dir};

/// Parameters for an evaluation sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateConfig {
    /// One sub-directory per dataset.
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Dataset cache. Defaults to `<output_dir>/datasets.json`.
    pub cache_file: Option<PathBuf>,
    /// Re-read the data directory even when a cache exists.
    pub reload: bool,
    pub ignore_columns: Vec<String>,
    #[serde(flatten)]
    pub evaluation: EvaluationConfig,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data_raw"),
            output_dir: PathBuf::from("results"),
            cache_file: None,
            reload: false,
            ignore_columns: Vec::new(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl EvaluateConfig {
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("datasets.json"))
    }

    pub fn reader(&self) -> TableReaderConfig {
        TableReaderConfig {
            label_column: self.evaluation.label_column.clone(),
            ignore_columns: self.ignore_columns.clone(),
        }
    }
}

/// Load an evaluation configuration from a JSON file.
pub fn load_evaluate_config<P: AsRef<Path>>(path: P) -> Result<EvaluateConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: EvaluateConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// Run every configured method and write `<method>.json` plus
/// `average_<method>.json` for each. Returns the written paths.
pub fn run_evaluation(config: &EvaluateConfig) -> Result<Vec<PathBuf>> {
    if config.evaluation.methods.is_empty() {
        anyhow::bail!("No methods selected");
    }
    let cache = config.cache_path();
    if config.reload || !cache.exists() {
        validate_dir(&config.data_dir)?;
    }

    let repository = DatasetRepository::new(config.reader());
    let datasets = repository.load_or_cache(&config.data_dir, &cache, config.reload)?;
    if datasets.is_empty() {
        anyhow::bail!("No datasets found in {}", config.data_dir.display());
    }

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let mut written = Vec::new();
    for &method in &config.evaluation.methods {
        let report = evaluate(method, &datasets, &config.evaluation);
        let raw = report_path(&config.output_dir, method);
        report.write_json(&raw)?;
        let averaged = average_path(&config.output_dir, method);
        report.average().write_json(&averaged)?;
        written.push(raw);
        written.push(averaged);
    }
    Ok(written)
}

/// Replace the configured methods when any were given on the command line.
pub fn override_methods(config: &mut EvaluateConfig, methods: Vec<Method>) {
    if !methods.is_empty() {
        config.evaluation.methods = methods;
    }
}
