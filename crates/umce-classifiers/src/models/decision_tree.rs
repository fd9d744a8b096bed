use anyhow::anyhow;
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};

use crate::config::{ClassifierFamily, TreeParams};
use crate::models::classifier_trait::{check_training_input, ClassifierModel};

/// Single CART decision tree backed by `linfa-trees`.
pub struct DecisionTreeClassifier {
    model: Option<DecisionTree<f64, usize>>,
    params: TreeParams,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        DecisionTreeClassifier {
            model: None,
            params,
        }
    }
}

/// Fit one linfa decision tree with the given hyper-parameters.
pub(crate) fn fit_tree(
    params: &TreeParams,
    x: &Array2<f64>,
    y: &[usize],
) -> anyhow::Result<DecisionTree<f64, usize>> {
    check_training_input(x, y)?;

    let split_quality = match params.split_quality.to_lowercase().as_str() {
        "gini" => SplitQuality::Gini,
        "entropy" => SplitQuality::Entropy,
        other => anyhow::bail!(
            "Unsupported split quality: {}. Valid options are: gini, entropy",
            other
        ),
    };

    let dataset = Dataset::new(x.to_owned(), Array1::from_vec(y.to_vec()));

    DecisionTree::params()
        .split_quality(split_quality)
        .max_depth(params.max_depth)
        .min_weight_split(params.min_weight_split)
        .min_weight_leaf(params.min_weight_leaf)
        .fit(&dataset)
        .map_err(|e: linfa::Error| anyhow!("decision tree fit failed: {}", e))
}

pub(crate) fn predict_tree(model: &DecisionTree<f64, usize>, x: &Array2<f64>) -> Vec<usize> {
    let predictions: Array1<usize> = model.predict(x);
    predictions.to_vec()
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()> {
        self.model = Some(fit_tree(&self.params, x, y)?);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("decision tree used before fit"))?;
        Ok(predict_tree(model, x))
    }

    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::DecisionTree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_tree_classifier() {
        // Second feature separates the classes perfectly
        let x = Array2::from_shape_vec(
            (10, 3),
            vec![
                0.1, 1.0, 5.0, 0.4, -1.0, 5.0, 0.6, 1.0, 5.0, 0.9, -1.0, 5.0, 1.2, 1.0, 5.0, 1.5,
                -1.0, 5.0, 1.8, 1.0, 5.0, 2.1, -1.0, 5.0, 2.4, 1.0, 5.0, 2.7, -1.0, 5.0,
            ],
        )
        .unwrap();
        let y = vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0];

        let mut classifier = DecisionTreeClassifier::new(TreeParams::default());
        classifier.fit(&x, &y).unwrap();
        let predictions = classifier.predict(&x).unwrap();

        assert_eq!(predictions, y);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let classifier = DecisionTreeClassifier::new(TreeParams::default());
        let x = Array2::<f64>::zeros((2, 2));
        assert!(classifier.predict(&x).is_err());
    }

    #[test]
    fn test_unknown_split_quality_errors() {
        let params = TreeParams {
            split_quality: "variance".to_string(),
            ..TreeParams::default()
        };
        let mut classifier = DecisionTreeClassifier::new(params);
        let x = Array2::<f64>::zeros((2, 1));
        assert!(classifier.fit(&x, &[0, 1]).is_err());
    }
}
