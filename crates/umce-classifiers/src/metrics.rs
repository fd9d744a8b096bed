//! Evaluation metrics for binary classification on hard labels.
//!
//! Labels are expected in the `{0, 1}` encoding of
//! [`LabelEncoding`](crate::data_handling::LabelEncoding), with `1` the
//! positive (minority) class.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UmceError};

/// Confusion matrix for the positive label `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[usize], y_pred: &[usize]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(UmceError::LabelEncoding(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let mut matrix = Self::default();
        for (idx, (&truth, &pred)) in y_true.iter().zip(y_pred.iter()).enumerate() {
            match (truth, pred) {
                (1, 1) => matrix.tp += 1,
                (0, 0) => matrix.tn += 1,
                (0, 1) => matrix.fp += 1,
                (1, 0) => matrix.fn_ += 1,
                _ => {
                    return Err(UmceError::LabelEncoding(format!(
                        "labels must be 0 or 1, got truth={} prediction={} at index {}",
                        truth, pred, idx
                    )))
                }
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn positives(&self) -> usize {
        self.tp + self.fn_
    }

    pub fn negatives(&self) -> usize {
        self.tn + self.fp
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FP), 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.positives())
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.negatives())
    }

    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / (precision + recall)
    }

    pub fn balanced_accuracy(&self) -> f64 {
        (self.recall() + self.specificity()) / 2.0
    }

    /// Area under the ROC curve traced by a single hard-label operating point:
    /// (0,0) -> (FPR, TPR) -> (1,1).
    pub fn hard_label_auc(&self) -> f64 {
        let tpr = self.recall();
        let fpr = ratio(self.fp, self.negatives());
        (1.0 + tpr - fpr) / 2.0
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// The metric vector reported for one (classifier family, dataset split).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    pub accuracy: f64,
    pub balanced_accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub classification_error: f64,
    /// Computed from hard labels, so it equals `balanced_accuracy`.
    pub auc_roc: f64,
}

impl MetricVector {
    pub const NAMES: [&'static str; 7] = [
        "accuracy",
        "balanced_accuracy",
        "precision",
        "recall",
        "f1_score",
        "classification_error",
        "auc_roc",
    ];

    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let accuracy = cm.accuracy();
        Self {
            accuracy,
            balanced_accuracy: cm.balanced_accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1_score: cm.f1_score(),
            classification_error: 1.0 - accuracy,
            auc_roc: cm.hard_label_auc(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "accuracy" => Some(self.accuracy),
            "balanced_accuracy" => Some(self.balanced_accuracy),
            "precision" => Some(self.precision),
            "recall" => Some(self.recall),
            "f1_score" => Some(self.f1_score),
            "classification_error" => Some(self.classification_error),
            "auc_roc" => Some(self.auc_roc),
            _ => None,
        }
    }

    /// `(name, value)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Self::NAMES
            .iter()
            .map(move |&name| (name, self.get(name).unwrap_or_default()))
    }

    /// Element-wise mean; `None` for an empty slice.
    pub fn mean(vectors: &[MetricVector]) -> Option<MetricVector> {
        if vectors.is_empty() {
            return None;
        }
        let n = vectors.len() as f64;
        let mut sum = MetricVector::default();
        for v in vectors {
            sum.accuracy += v.accuracy;
            sum.balanced_accuracy += v.balanced_accuracy;
            sum.precision += v.precision;
            sum.recall += v.recall;
            sum.f1_score += v.f1_score;
            sum.classification_error += v.classification_error;
            sum.auc_roc += v.auc_roc;
        }
        Some(MetricVector {
            accuracy: sum.accuracy / n,
            balanced_accuracy: sum.balanced_accuracy / n,
            precision: sum.precision / n,
            recall: sum.recall / n,
            f1_score: sum.f1_score / n,
            classification_error: sum.classification_error / n,
            auc_roc: sum.auc_roc / n,
        })
    }
}

/// Score hard-label predictions against the ground truth.
///
/// # Errors
///
/// * `LabelEncoding` if the lengths differ or a label is not 0/1.
/// * `UndefinedMetric` if `y_true` holds a single class, where balanced
///   accuracy and AUC-ROC have no meaning.
pub fn score(y_true: &[usize], y_pred: &[usize]) -> Result<MetricVector> {
    let cm = ConfusionMatrix::from_labels(y_true, y_pred)?;
    if cm.positives() == 0 || cm.negatives() == 0 {
        return Err(UmceError::UndefinedMetric {
            metric: "auc_roc",
            reason: format!(
                "ground truth contains only one class ({} positives, {} negatives)",
                cm.positives(),
                cm.negatives()
            ),
        });
    }
    Ok(MetricVector::from_confusion_matrix(&cm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_score_known_values() {
        let m = score(&[1, 1, 0, 0], &[1, 0, 0, 0]).unwrap();
        assert_abs_diff_eq!(m.accuracy, 0.75);
        assert_abs_diff_eq!(m.precision, 1.0);
        assert_abs_diff_eq!(m.recall, 0.5);
        assert_abs_diff_eq!(m.f1_score, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.classification_error, 0.25);
        assert_abs_diff_eq!(m.balanced_accuracy, 0.75);
    }

    #[test]
    fn test_auc_equals_balanced_accuracy_on_hard_labels() {
        let y_true = [1, 0, 0, 1, 0, 0, 0, 1, 0, 0];
        let y_pred = [1, 1, 0, 0, 0, 0, 1, 1, 0, 0];
        let m = score(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(m.auc_roc, m.balanced_accuracy, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_division_defaults_to_zero() {
        let m = score(&[1, 0, 0], &[0, 0, 0]).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
    }

    #[test]
    fn test_rejects_labels_outside_binary_domain() {
        assert!(matches!(score(&[1, 2], &[1, 0]), Err(UmceError::LabelEncoding(_))));
        assert!(matches!(score(&[1, 0], &[1]), Err(UmceError::LabelEncoding(_))));
    }

    #[test]
    fn test_single_class_truth_is_undefined() {
        assert!(matches!(
            score(&[0, 0, 0], &[0, 1, 0]),
            Err(UmceError::UndefinedMetric { .. })
        ));
    }

    #[test]
    fn test_mean_of_vectors() {
        let a = score(&[1, 0], &[1, 0]).unwrap();
        let b = score(&[1, 0], &[0, 1]).unwrap();
        let m = MetricVector::mean(&[a, b]).unwrap();
        assert_abs_diff_eq!(m.accuracy, 0.5);
        assert!(MetricVector::mean(&[]).is_none());
    }
}
