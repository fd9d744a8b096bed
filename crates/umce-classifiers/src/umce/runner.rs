use crate::config::{ClassifierFamily, EvaluationConfig, ModelConfig};
use crate::data_handling::{DatasetSplit, Datasets, LabelEncoding};
use crate::error::UmceError;
use crate::metrics;
use crate::models::ClassifierFactory;
use crate::outcome::{record_split, FamilyOutcome, MethodResults, RunStage, SplitOutcome, StageFailure};
use crate::umce::partition::partition;
use crate::umce::trainer::{EnsembleTrainer, FamilyEnsemble};
use crate::umce::vote;

/// Runs the UMCE procedure over every split of every dataset.
///
/// Each split walks `Start -> PartitionFolds -> TrainEnsemble ->
/// AggregateVotes -> ComputeMetrics -> Done`. A failure before
/// `AggregateVotes` skips the whole split; from there on it only skips the
/// affected family. The run itself never aborts.
pub struct UmceRunner<'a, F: ClassifierFactory + ?Sized> {
    factory: &'a F,
    families: Vec<ClassifierFamily>,
    encoding: LabelEncoding,
    shuffle_seed: u64,
    parallel: bool,
}

impl<'a> UmceRunner<'a, ModelConfig> {
    pub fn from_config(config: &'a EvaluationConfig) -> Self {
        UmceRunner::new(
            &config.model,
            config.model.families.clone(),
            LabelEncoding::new(&config.positive_label, &config.negative_label),
            config.shuffle_seed,
        )
        .with_parallel(config.parallel)
    }
}

impl<'a, F: ClassifierFactory + ?Sized> UmceRunner<'a, F> {
    pub fn new(
        factory: &'a F,
        families: Vec<ClassifierFamily>,
        encoding: LabelEncoding,
        shuffle_seed: u64,
    ) -> Self {
        Self {
            factory,
            families,
            encoding,
            shuffle_seed,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, datasets: &Datasets) -> MethodResults {
        let mut results = MethodResults::new();
        for (name, splits) in datasets {
            log::info!("UMCE: evaluating {} ({} splits)", name, splits.len());
            for (split_idx, split) in splits.iter().enumerate() {
                let outcome = self.run_split(name, split_idx, split);
                record_split(&mut results, name, &self.families, outcome);
            }
        }
        results
    }

    pub fn run_split(
        &self,
        dataset: &str,
        split_idx: usize,
        split: &DatasetSplit,
    ) -> Result<SplitOutcome, StageFailure> {
        let fail = |stage: RunStage, cause: UmceError| StageFailure::new(dataset, stage, cause);
        let DatasetSplit { train, test } = split;

        log::debug!("{} split {}: {:?}", dataset, split_idx, RunStage::Start);
        train.log_summary(&format!("{} split {} train", dataset, split_idx));
        train.check_schema(test).map_err(|e| fail(RunStage::Start, e))?;
        let y_test = test
            .encode_labels(&self.encoding)
            .map_err(|e| fail(RunStage::Start, e))?;
        let classes = train
            .split_by_class(&self.encoding)
            .map_err(|e| fail(RunStage::Start, e))?;

        let folds = partition(&classes.majority, &classes.minority, self.shuffle_seed)
            .map_err(|e| fail(RunStage::PartitionFolds, e))?;
        log::info!(
            "{} split {}: IR {:.2}, {} folds of '{}' against {} '{}' rows",
            dataset,
            split_idx,
            classes.imbalance_ratio().unwrap_or_default(),
            folds.len(),
            classes.majority.label,
            classes.minority.len(),
            classes.minority.label
        );

        let ensembles = EnsembleTrainer::new(self.factory, self.families.clone(), self.encoding.clone())
            .with_parallel(self.parallel)
            .train_and_predict(&folds, &classes.minority, &test.x)
            .map_err(|e| fail(RunStage::TrainEnsemble, e))?;

        let outcome: SplitOutcome = ensembles
            .into_iter()
            .map(|(family, ensemble)| {
                let result = score_family(family, ensemble, &y_test);
                if let FamilyOutcome::Skipped { stage, cause } = &result {
                    log::warn!("{} split {}: {} skipped at {}: {}", dataset, split_idx, family, stage, cause);
                }
                (family, result)
            })
            .collect();

        log::debug!("{} split {}: {:?}", dataset, split_idx, RunStage::Done);
        Ok(outcome)
    }
}

fn score_family(
    family: ClassifierFamily,
    ensemble: FamilyEnsemble,
    y_test: &[usize],
) -> FamilyOutcome {
    let consensus = match vote::aggregate(&ensemble.prediction_vectors()) {
        Ok(consensus) => consensus,
        Err(UmceError::EmptyEnsemble(_)) => {
            let cause = UmceError::EmptyEnsemble(Some(family));
            let detail = ensemble
                .failures
                .first()
                .map(|f| format!(" ({} members failed, first: {})", ensemble.failures.len(), f))
                .unwrap_or_default();
            return FamilyOutcome::skipped(RunStage::AggregateVotes, format!("{}{}", cause, detail));
        }
        Err(e) => return FamilyOutcome::skipped(RunStage::AggregateVotes, e),
    };

    match metrics::score(y_test, &consensus) {
        Ok(metrics) => FamilyOutcome::Scored {
            metrics,
            members: ensemble.members.len(),
            skipped_members: ensemble.failures,
        },
        Err(e) => FamilyOutcome::skipped(RunStage::ComputeMetrics, e),
    }
}
