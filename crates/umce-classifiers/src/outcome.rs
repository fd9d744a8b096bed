//! Per-split results shared by the ensemble runner and the single-model
//! pipelines.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ClassifierFamily;
use crate::error::TrainingFailure;
use crate::metrics::MetricVector;

/// Stages a dataset split passes through. A failure is reported against the
/// stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Start,
    Resample,
    PartitionFolds,
    TrainEnsemble,
    TrainModel,
    AggregateVotes,
    ComputeMetrics,
    Done,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Start => "start",
            RunStage::Resample => "resample",
            RunStage::PartitionFolds => "partition_folds",
            RunStage::TrainEnsemble => "train_ensemble",
            RunStage::TrainModel => "train_model",
            RunStage::AggregateVotes => "aggregate_votes",
            RunStage::ComputeMetrics => "compute_metrics",
            RunStage::Done => "done",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A split that stopped before any family could be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub dataset: String,
    pub stage: RunStage,
    pub cause: String,
}

impl StageFailure {
    pub fn new(dataset: &str, stage: RunStage, cause: impl fmt::Display) -> Self {
        Self {
            dataset: dataset.to_string(),
            stage,
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} failed at {}: {}", self.dataset, self.stage, self.cause)
    }
}

/// What happened to one classifier family on one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FamilyOutcome {
    Scored {
        metrics: MetricVector,
        /// Models whose predictions went into `metrics`.
        members: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        skipped_members: Vec<TrainingFailure>,
    },
    Skipped {
        stage: RunStage,
        cause: String,
    },
}

impl FamilyOutcome {
    pub fn metrics(&self) -> Option<&MetricVector> {
        match self {
            FamilyOutcome::Scored { metrics, .. } => Some(metrics),
            FamilyOutcome::Skipped { .. } => None,
        }
    }

    pub fn skipped(stage: RunStage, cause: impl fmt::Display) -> Self {
        FamilyOutcome::Skipped {
            stage,
            cause: cause.to_string(),
        }
    }
}

pub type SplitOutcome = BTreeMap<ClassifierFamily, FamilyOutcome>;

/// `dataset -> family -> outcome per split`, in split order.
pub type MethodResults = BTreeMap<String, BTreeMap<ClassifierFamily, Vec<FamilyOutcome>>>;

/// Append one split's outcome to `results`. A stage failure marks every
/// family in `families` as skipped for that split.
pub fn record_split(
    results: &mut MethodResults,
    dataset: &str,
    families: &[ClassifierFamily],
    outcome: std::result::Result<SplitOutcome, StageFailure>,
) {
    let per_family = results.entry(dataset.to_string()).or_default();
    match outcome {
        Ok(split) => {
            for (family, family_outcome) in split {
                per_family.entry(family).or_default().push(family_outcome);
            }
        }
        Err(failure) => {
            log::warn!("{}", failure);
            for &family in families {
                per_family
                    .entry(family)
                    .or_default()
                    .push(FamilyOutcome::skipped(failure.stage, &failure.cause));
            }
        }
    }
}
