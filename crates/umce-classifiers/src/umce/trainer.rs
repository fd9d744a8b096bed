use std::collections::BTreeMap;

use ndarray::Array2;
use rayon::prelude::*;

use crate::config::ClassifierFamily;
use crate::data_handling::{ClassPartition, LabelEncoding};
use crate::error::{Result, TrainingFailure};
use crate::models::ClassifierFactory;
use crate::umce::partition::Fold;
use crate::umce::vote::PredictionVector;

/// Predictions of one fitted ensemble member on the test set.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    pub fold_index: usize,
    pub predictions: PredictionVector,
}

/// Members of one classifier family, in fold order, plus the folds that
/// produced no member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyEnsemble {
    pub members: Vec<EnsembleMember>,
    pub failures: Vec<TrainingFailure>,
}

impl FamilyEnsemble {
    pub fn prediction_vectors(&self) -> Vec<PredictionVector> {
        self.members.iter().map(|m| m.predictions.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

type FoldOutcome = Vec<(ClassifierFamily, std::result::Result<PredictionVector, TrainingFailure>)>;

/// Fits one model per (fold, family) on `fold ∪ minority` and collects its
/// predictions on the shared test features.
///
/// A member that fails to fit or predict is recorded in
/// [`FamilyEnsemble::failures`] and the remaining members are kept.
pub struct EnsembleTrainer<'a, F: ClassifierFactory + ?Sized> {
    factory: &'a F,
    families: Vec<ClassifierFamily>,
    encoding: LabelEncoding,
    parallel: bool,
}

impl<'a, F: ClassifierFactory + ?Sized> EnsembleTrainer<'a, F> {
    pub fn new(factory: &'a F, families: Vec<ClassifierFamily>, encoding: LabelEncoding) -> Self {
        Self {
            factory,
            families,
            encoding,
            parallel: false,
        }
    }

    /// Train folds on the rayon thread pool. Member order stays by fold index.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn train_and_predict(
        &self,
        folds: &[Fold],
        minority: &ClassPartition,
        test_x: &Array2<f64>,
    ) -> Result<BTreeMap<ClassifierFamily, FamilyEnsemble>> {
        let outcomes: Vec<FoldOutcome> = if self.parallel {
            folds
                .par_iter()
                .map(|fold| self.train_fold(fold, minority, test_x))
                .collect::<Result<_>>()?
        } else {
            folds
                .iter()
                .map(|fold| self.train_fold(fold, minority, test_x))
                .collect::<Result<_>>()?
        };

        let mut ensembles: BTreeMap<ClassifierFamily, FamilyEnsemble> = self
            .families
            .iter()
            .map(|&family| (family, FamilyEnsemble::default()))
            .collect();

        for (fold, outcome) in folds.iter().zip(outcomes) {
            for (family, result) in outcome {
                let ensemble = ensembles.entry(family).or_default();
                match result {
                    Ok(predictions) => ensemble.members.push(EnsembleMember {
                        fold_index: fold.index,
                        predictions,
                    }),
                    Err(failure) => {
                        log::warn!("Skipping ensemble member: {}", failure);
                        ensemble.failures.push(failure);
                    }
                }
            }
        }

        for (family, ensemble) in &ensembles {
            log::debug!(
                "{}: {} members trained, {} skipped",
                family,
                ensemble.members.len(),
                ensemble.failures.len()
            );
        }

        Ok(ensembles)
    }

    fn train_fold(
        &self,
        fold: &Fold,
        minority: &ClassPartition,
        test_x: &Array2<f64>,
    ) -> Result<FoldOutcome> {
        if fold.is_empty() {
            return Ok(self
                .families
                .iter()
                .map(|&family| {
                    (
                        family,
                        Err(TrainingFailure::new(
                            family,
                            Some(fold.index),
                            "fold holds no majority rows",
                        )),
                    )
                })
                .collect());
        }

        let train = fold.training_set(minority)?;
        let y = train.encode_labels(&self.encoding)?;

        Ok(self
            .families
            .iter()
            .map(|&family| {
                let result = self
                    .fit_predict(family, fold.index, &train.x, &y, test_x)
                    .map_err(|e| TrainingFailure::new(family, Some(fold.index), format!("{:#}", e)));
                (family, result)
            })
            .collect())
    }

    fn fit_predict(
        &self,
        family: ClassifierFamily,
        member: usize,
        x: &Array2<f64>,
        y: &[usize],
        test_x: &Array2<f64>,
    ) -> anyhow::Result<PredictionVector> {
        let mut model = self.factory.build(family, member);
        model.fit(x, y)?;
        let predictions = model.predict(test_x)?;
        if predictions.len() != test_x.nrows() {
            anyhow::bail!(
                "{} returned {} predictions for {} test rows",
                model.name(),
                predictions.len(),
                test_x.nrows()
            );
        }
        Ok(predictions)
    }
}
