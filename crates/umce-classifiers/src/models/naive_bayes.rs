use anyhow::anyhow;
use linfa::prelude::*;
use linfa_bayes::{GaussianNb, NaiveBayesError};
use ndarray::{Array1, Array2};

use crate::config::{ClassifierFamily, NaiveBayesParams};
use crate::models::classifier_trait::{check_training_input, ClassifierModel};

/// Gaussian naive Bayes backed by `linfa-bayes`.
pub struct NaiveBayesClassifier {
    model: Option<GaussianNb<f64, usize>>,
    params: NaiveBayesParams,
}

impl NaiveBayesClassifier {
    pub fn new(params: NaiveBayesParams) -> Self {
        NaiveBayesClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for NaiveBayesClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()> {
        check_training_input(x, y)?;

        let dataset = Dataset::new(x.to_owned(), Array1::from_vec(y.to_vec()));
        let model = GaussianNb::params()
            .var_smoothing(self.params.var_smoothing)
            .fit(&dataset)
            .map_err(|e: NaiveBayesError| anyhow!("naive Bayes fit failed: {}", e))?;

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("naive Bayes used before fit"))?;
        let predictions: Array1<usize> = model.predict(x);
        Ok(predictions.to_vec())
    }

    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::NaiveBayes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_naive_bayes_separates_gaussian_blobs() {
        let x = array![
            [0.0, 0.1],
            [0.2, -0.1],
            [-0.1, 0.0],
            [0.1, 0.2],
            [5.0, 5.1],
            [5.2, 4.9],
            [4.9, 5.0],
            [5.1, 5.2]
        ];
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];

        let mut classifier = NaiveBayesClassifier::new(NaiveBayesParams::default());
        classifier.fit(&x, &y).unwrap();

        let predictions = classifier.predict(&array![[0.05, 0.0], [5.0, 5.05]]).unwrap();
        assert_eq!(predictions, vec![0, 1]);
    }

    #[test]
    fn test_empty_training_set_errors() {
        let mut classifier = NaiveBayesClassifier::new(NaiveBayesParams::default());
        let x = Array2::<f64>::zeros((0, 2));
        assert!(classifier.fit(&x, &[]).is_err());
    }
}
