//! Single-model pipeline shared by the baseline and the sampling methods:
//! optional resampling, optional standardization, one classifier per family
//! fit on the whole training table.
use ndarray::Array2;

use crate::config::{ClassifierFamily, EvaluationConfig, ModelConfig};
use crate::data_handling::{DatasetSplit, Datasets, LabelEncoding, LabeledTable};
use crate::metrics;
use crate::models::ClassifierFactory;
use crate::outcome::{record_split, FamilyOutcome, MethodResults, RunStage, SplitOutcome, StageFailure};
use crate::preprocessing::{fit_scaler, transform_all};
use crate::sampling::Sampler;

pub struct SingleModelPipeline<'a, F: ClassifierFactory + ?Sized> {
    factory: &'a F,
    families: Vec<ClassifierFamily>,
    encoding: LabelEncoding,
    sampler: Option<Box<dyn Sampler>>,
    sampling_seed: u64,
    scale_features: bool,
}

impl<'a> SingleModelPipeline<'a, ModelConfig> {
    pub fn from_config(config: &'a EvaluationConfig, sampler: Option<Box<dyn Sampler>>) -> Self {
        SingleModelPipeline::new(
            &config.model,
            config.model.families.clone(),
            LabelEncoding::new(&config.positive_label, &config.negative_label),
        )
        .with_sampler(sampler, config.sampling.seed)
        .with_scaling(config.scale_features)
    }
}

impl<'a, F: ClassifierFactory + ?Sized> SingleModelPipeline<'a, F> {
    pub fn new(factory: &'a F, families: Vec<ClassifierFamily>, encoding: LabelEncoding) -> Self {
        Self {
            factory,
            families,
            encoding,
            sampler: None,
            sampling_seed: 42,
            scale_features: false,
        }
    }

    pub fn with_sampler(mut self, sampler: Option<Box<dyn Sampler>>, seed: u64) -> Self {
        self.sampler = sampler;
        self.sampling_seed = seed;
        self
    }

    pub fn with_scaling(mut self, scale_features: bool) -> Self {
        self.scale_features = scale_features;
        self
    }

    pub fn run(&self, datasets: &Datasets) -> MethodResults {
        let label = self.sampler.as_ref().map_or("baseline", |s| s.name());
        let mut results = MethodResults::new();
        for (name, splits) in datasets {
            log::info!("{}: evaluating {} ({} splits)", label, name, splits.len());
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
        let fail = |stage: RunStage, cause: crate::error::UmceError| StageFailure::new(dataset, stage, cause);
        let DatasetSplit { train, test } = split;

        train.check_schema(test).map_err(|e| fail(RunStage::Start, e))?;
        let y_test = test
            .encode_labels(&self.encoding)
            .map_err(|e| fail(RunStage::Start, e))?;

        let resampled;
        let train: &LabeledTable = match &self.sampler {
            Some(sampler) => {
                resampled = sampler
                    .resample(train, &self.encoding, self.sampling_seed)
                    .map_err(|e| fail(RunStage::Resample, e))?;
                resampled.log_summary(&format!("{} split {} {}", dataset, split_idx, sampler.name()));
                &resampled
            }
            None => train,
        };
        let y_train = train
            .encode_labels(&self.encoding)
            .map_err(|e| fail(RunStage::Start, e))?;

        let (x_train, x_test) = if self.scale_features {
            let scaler = fit_scaler(&train.x).map_err(|e| fail(RunStage::TrainModel, e))?;
            (
                transform_all(&train.x, &scaler).map_err(|e| fail(RunStage::TrainModel, e))?,
                transform_all(&test.x, &scaler).map_err(|e| fail(RunStage::TrainModel, e))?,
            )
        } else {
            (train.x.clone(), test.x.clone())
        };

        let outcome: SplitOutcome = self
            .families
            .iter()
            .map(|&family| {
                let result = self.score_family(family, &x_train, &y_train, &x_test, &y_test);
                if let FamilyOutcome::Skipped { stage, cause } = &result {
                    log::warn!("{} split {}: {} skipped at {}: {}", dataset, split_idx, family, stage, cause);
                }
                (family, result)
            })
            .collect();
        Ok(outcome)
    }

    fn score_family(
        &self,
        family: ClassifierFamily,
        x_train: &Array2<f64>,
        y_train: &[usize],
        x_test: &Array2<f64>,
        y_test: &[usize],
    ) -> FamilyOutcome {
        let mut model = self.factory.build(family, 0);
        let predictions = match model.fit(x_train, y_train).and_then(|_| model.predict(x_test)) {
            Ok(p) => p,
            Err(e) => return FamilyOutcome::skipped(RunStage::TrainModel, format!("{:#}", e)),
        };

        match metrics::score(y_test, &predictions) {
            Ok(metrics) => FamilyOutcome::Scored {
                metrics,
                members: 1,
                skipped_members: Vec::new(),
            },
            Err(e) => FamilyOutcome::skipped(RunStage::ComputeMetrics, e),
        }
    }
}
