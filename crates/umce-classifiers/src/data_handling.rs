//! Data structures and helpers for labelled tabular datasets.
//!
//! This module defines `LabeledTable` (feature matrix plus a two-valued
//! label column), the `LabelEncoding` that maps raw class names to `{0, 1}`,
//! and the class partitions the balancing methods operate on.
use std::collections::BTreeMap;

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UmceError};

/// Fixed mapping from raw class names to the binary encoding used by the
/// classifiers and the metrics (`negative -> 0`, `positive -> 1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    pub positive: String,
    pub negative: String,
}

impl LabelEncoding {
    pub const NEGATIVE: usize = 0;
    pub const POSITIVE: usize = 1;

    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        let label = label.trim();
        if label == self.positive {
            Ok(Self::POSITIVE)
        } else if label == self.negative {
            Ok(Self::NEGATIVE)
        } else {
            Err(UmceError::LabelEncoding(format!(
                "label '{}' is neither '{}' nor '{}'",
                label, self.positive, self.negative
            )))
        }
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }
}

impl Default for LabelEncoding {
    fn default() -> Self {
        Self::new("positive", "negative")
    }
}

/// Rows of numeric features with one categorical label column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTable {
    pub feature_names: Vec<String>,
    pub label_column: String,
    /// Feature matrix, shape (n_rows, n_features).
    pub x: Array2<f64>,
    /// Raw class value per row.
    pub labels: Vec<String>,
}

impl LabeledTable {
    pub fn new(
        feature_names: Vec<String>,
        label_column: impl Into<String>,
        x: Array2<f64>,
        labels: Vec<String>,
    ) -> Result<Self> {
        if x.ncols() != feature_names.len() {
            return Err(UmceError::Schema(format!(
                "{} feature names for a matrix with {} columns",
                feature_names.len(),
                x.ncols()
            )));
        }
        if x.nrows() != labels.len() {
            return Err(UmceError::Schema(format!(
                "{} labels for a matrix with {} rows",
                labels.len(),
                x.nrows()
            )));
        }
        Ok(Self {
            feature_names,
            label_column: label_column.into(),
            x,
            labels,
        })
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    /// Copy of this table restricted to `indices` (in the given order).
    pub fn select_rows(&self, indices: &[usize]) -> LabeledTable {
        let x = if indices.is_empty() {
            Array2::zeros((0, self.n_features()))
        } else {
            self.x.select(Axis(0), indices)
        };
        LabeledTable {
            feature_names: self.feature_names.clone(),
            label_column: self.label_column.clone(),
            x,
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    /// Fails with a schema error unless both tables carry the same features
    /// in the same order and the same label column.
    pub fn check_schema(&self, other: &LabeledTable) -> Result<()> {
        if self.feature_names != other.feature_names {
            return Err(UmceError::Schema(format!(
                "feature columns differ ({} vs {} columns)",
                self.feature_names.len(),
                other.feature_names.len()
            )));
        }
        if self.label_column != other.label_column {
            return Err(UmceError::Schema(format!(
                "label column '{}' vs '{}'",
                self.label_column, other.label_column
            )));
        }
        Ok(())
    }

    /// Rows of `self` followed by rows of `other`.
    pub fn concat(&self, other: &LabeledTable) -> Result<LabeledTable> {
        self.check_schema(other)?;
        let x = concatenate(Axis(0), &[self.x.view(), other.x.view()])
            .map_err(|e| UmceError::Schema(e.to_string()))?;
        let mut labels = self.labels.clone();
        labels.extend(other.labels.iter().cloned());
        LabeledTable::new(self.feature_names.clone(), self.label_column.clone(), x, labels)
    }

    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn encode_labels(&self, encoding: &LabelEncoding) -> Result<Vec<usize>> {
        encoding.encode_all(&self.labels)
    }

    /// Split the rows into minority and majority class partitions.
    ///
    /// The minority class is the encoded class with fewer rows; on a tie the
    /// positive class is treated as the minority. A class that does not occur
    /// yields an empty partition.
    pub fn split_by_class(&self, encoding: &LabelEncoding) -> Result<ClassSplit> {
        let encoded = self.encode_labels(encoding)?;
        let mut positives = Vec::new();
        let mut negatives = Vec::new();
        for (i, &label) in encoded.iter().enumerate() {
            if label == LabelEncoding::POSITIVE {
                positives.push(i);
            } else {
                negatives.push(i);
            }
        }

        let positive = ClassPartition {
            label: encoding.positive.clone(),
            table: self.select_rows(&positives),
        };
        let negative = ClassPartition {
            label: encoding.negative.clone(),
            table: self.select_rows(&negatives),
        };

        let (minority, majority) = if positives.len() <= negatives.len() {
            (positive, negative)
        } else {
            (negative, positive)
        };

        Ok(ClassSplit { minority, majority })
    }

    pub fn log_summary(&self, name: &str) {
        let counts = self
            .class_counts()
            .iter()
            .map(|(label, n)| format!("{}={}", label, n))
            .collect::<Vec<_>>()
            .join(", ");
        log::debug!(
            "{}: {} rows x {} features ({})",
            name,
            self.nrows(),
            self.n_features(),
            counts
        );
    }
}

/// A table restricted to rows of a single class value.
#[derive(Debug, Clone)]
pub struct ClassPartition {
    pub label: String,
    pub table: LabeledTable,
}

impl ClassPartition {
    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ClassSplit {
    pub minority: ClassPartition,
    pub majority: ClassPartition,
}

impl ClassSplit {
    /// Majority count over minority count; `None` when the minority is empty.
    pub fn imbalance_ratio(&self) -> Option<f64> {
        if self.minority.is_empty() {
            None
        } else {
            Some(self.majority.len() as f64 / self.minority.len() as f64)
        }
    }
}

/// One train/test pair of a cross-validated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSplit {
    pub train: LabeledTable,
    pub test: LabeledTable,
}

/// Dataset name to its splits, in split order.
pub type Datasets = BTreeMap<String, Vec<DatasetSplit>>;

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> LabeledTable {
        LabeledTable::new(
            vec!["a".into(), "b".into()],
            "Class",
            array![[0.0, 1.0], [1.0, 1.0], [2.0, 0.0], [3.0, 0.0], [4.0, 2.0]],
            vec![
                "negative".into(),
                "positive".into(),
                "negative".into(),
                "negative".into(),
                "positive".into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_by_class_picks_smaller_class_as_minority() {
        let split = table().split_by_class(&LabelEncoding::default()).unwrap();
        assert_eq!(split.minority.label, "positive");
        assert_eq!(split.minority.len(), 2);
        assert_eq!(split.majority.len(), 3);
        assert_eq!(split.minority.table.x.row(0).to_vec(), vec![1.0, 1.0]);
        assert!((split.imbalance_ratio().unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_split_by_class_rejects_unknown_label() {
        let mut t = table();
        t.labels[0] = "maybe".into();
        assert!(matches!(
            t.split_by_class(&LabelEncoding::default()),
            Err(UmceError::LabelEncoding(_))
        ));
    }

    #[test]
    fn test_concat_requires_same_schema() {
        let t = table();
        let mut other = table();
        other.feature_names[1] = "c".into();
        assert!(matches!(t.concat(&other), Err(UmceError::Schema(_))));

        let joined = t.concat(&table()).unwrap();
        assert_eq!(joined.nrows(), 10);
        assert_eq!(joined.labels[5], "negative");
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let res = LabeledTable::new(vec!["a".into()], "Class", array![[1.0, 2.0]], vec!["positive".into()]);
        assert!(res.is_err());
    }
}
