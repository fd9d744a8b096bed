use ndarray::Array2;

use crate::config::ClassifierFamily;

/// Fit/predict capability shared by every classifier family.
///
/// Labels use the crate convention (1 for the positive/minority class, 0 for
/// the negative class). Implementations are opaque to the evaluation code:
/// the ensemble trainer and the baseline pipeline only ever call `fit` on a
/// fresh instance and then `predict`.
pub trait ClassifierModel: Send {
    /// Fit the model on `x` (n_samples, n_features) and `y` (n_samples,).
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()>;

    /// Predict one hard label per row of `x`. Fails if called before `fit`.
    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<usize>>;

    fn family(&self) -> ClassifierFamily;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        self.family().as_str()
    }
}

pub(crate) fn check_training_input(x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()> {
    if x.nrows() == 0 {
        anyhow::bail!("empty training set");
    }
    if x.nrows() != y.len() {
        anyhow::bail!("{} training rows but {} labels", x.nrows(), y.len());
    }
    Ok(())
}
