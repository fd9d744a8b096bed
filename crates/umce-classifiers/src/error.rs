use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClassifierFamily;

pub type Result<T> = std::result::Result<T, UmceError>;

/// A single ensemble member (or baseline model) that could not be fit or
/// could not predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingFailure {
    pub family: ClassifierFamily,
    /// `None` for single-model pipelines that have no fold index.
    pub fold_index: Option<usize>,
    pub cause: String,
}

impl TrainingFailure {
    pub fn new(family: ClassifierFamily, fold_index: Option<usize>, cause: impl Into<String>) -> Self {
        Self {
            family,
            fold_index,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for TrainingFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.fold_index {
            Some(idx) => write!(f, "{} failed on fold {}: {}", self.family, idx, self.cause),
            None => write!(f, "{} failed: {}", self.family, self.cause),
        }
    }
}

/// Errors raised by the evaluation core.
#[derive(Debug, Error)]
pub enum UmceError {
    /// Empty class partition, mismatched vector lengths or a similar input
    /// that leaves nothing to work with.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Every member of a family's ensemble was skipped.
    #[error("empty ensemble: no prediction vectors to aggregate{}", family_suffix(.0))]
    EmptyEnsemble(Option<ClassifierFamily>),

    #[error("label encoding error: {0}")]
    LabelEncoding(String),

    /// Train/test tables disagree on their feature schema, or a table is malformed.
    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("sampling error: {0}")]
    Sampling(String),

    /// The metric cannot be computed for this label distribution.
    #[error("undefined metric {metric}: {reason}")]
    UndefinedMetric { metric: &'static str, reason: String },
}

fn family_suffix(family: &Option<ClassifierFamily>) -> String {
    match family {
        Some(f) => format!(" for {}", f),
        None => String::new(),
    }
}
