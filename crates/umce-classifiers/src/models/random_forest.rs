use anyhow::anyhow;
use linfa_trees::DecisionTree;
use ndarray::{Array2, Axis};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::{ClassifierFamily, ForestParams};
use crate::models::classifier_trait::{check_training_input, ClassifierModel};
use crate::models::decision_tree::{fit_tree, predict_tree};
use crate::umce::vote;

/// One bagged tree and the feature columns it was trained on.
struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Bagging ensemble of `linfa-trees` decision trees.
///
/// Every tree is fit on a bootstrap sample of the rows and a random subset of
/// the feature columns. A seeded forest draws one seed per tree from a
/// `ChaCha8Rng` seeded with the forest seed before any tree is fit, so the
/// result does not depend on how rayon schedules the trees, and forests with
/// neighbouring seeds do not share tree streams.
pub struct RandomForestClassifier {
    trees: Vec<ForestTree>,
    params: ForestParams,
    seed: Option<u64>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams, seed: Option<u64>) -> Self {
        RandomForestClassifier {
            trees: Vec::new(),
            params,
            seed,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// One seed per tree, `None` entries for an unseeded forest.
    fn tree_seeds(&self) -> Vec<Option<u64>> {
        match self.seed {
            Some(seed) => {
                let mut seeder = ChaCha8Rng::seed_from_u64(seed);
                (0..self.params.n_estimators)
                    .map(|_| Some(seeder.gen::<u64>()))
                    .collect()
            }
            None => vec![None; self.params.n_estimators],
        }
    }

    fn bootstrap_rows(&self, rng: &mut ChaCha8Rng, n_samples: usize) -> Vec<usize> {
        if self.params.bootstrap {
            (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
        } else {
            (0..n_samples).collect()
        }
    }

    fn fit_one(&self, seed: Option<u64>, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<ForestTree> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let rows = self.bootstrap_rows(&mut rng, n_samples);

        let n_selected = self.params.max_features.resolve(n_features);
        let mut features = sample(&mut rng, n_features, n_selected).into_vec();
        features.sort_unstable();

        let x_boot = x.select(Axis(0), &rows).select(Axis(1), &features);
        let y_boot: Vec<usize> = rows.iter().map(|&i| y[i]).collect();

        let tree = fit_tree(&self.params.tree, &x_boot, &y_boot)?;
        Ok(ForestTree { features, tree })
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()> {
        check_training_input(x, y)?;
        if x.ncols() == 0 {
            anyhow::bail!("random forest needs at least one feature column");
        }
        if self.params.n_estimators == 0 {
            anyhow::bail!("random forest needs n_estimators >= 1");
        }

        let trees = self
            .tree_seeds()
            .into_par_iter()
            .map(|seed| self.fit_one(seed, x, y))
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::trace!(
            "random forest fit {} trees on {} rows x {} features",
            trees.len(),
            x.nrows(),
            x.ncols()
        );
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<usize>> {
        if self.trees.is_empty() {
            anyhow::bail!("random forest used before fit");
        }

        let votes: Vec<Vec<usize>> = self
            .trees
            .par_iter()
            .map(|t| predict_tree(&t.tree, &x.select(Axis(1), &t.features)))
            .collect();

        vote::aggregate(&votes).map_err(|e| anyhow!("random forest vote failed: {}", e))
    }

    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::RandomForest
    }
}
