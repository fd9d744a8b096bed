//! Class-rebalancing samplers used by the single-model comparison methods.
//!
//! - Random undersampling of the majority class
//! - Random oversampling of the minority class
//! - SMOTE
//! - ADASYN
mod adasyn;
mod random;
mod smote;

pub use adasyn::Adasyn;
pub use random::{RandomOverSampler, RandomUnderSampler};
pub use smote::Smote;

use ndarray::{Array2, ArrayView1};
use rand::Rng;

use crate::config::{Method, SamplingConfig};
use crate::data_handling::{ClassSplit, LabelEncoding, LabeledTable};
use crate::error::{Result, UmceError};

/// Rebalances a training table. Minority and majority are decided by class
/// counts, and the output carries the same schema as the input.
pub trait Sampler: Send + Sync {
    fn name(&self) -> &'static str;

    fn resample(&self, table: &LabeledTable, encoding: &LabelEncoding, seed: u64) -> Result<LabeledTable>;
}

/// The sampler a comparison method trains on, `None` for methods that use the
/// training table as is.
pub fn sampler_for(method: Method, config: &SamplingConfig) -> Option<Box<dyn Sampler>> {
    match method {
        Method::RandomUndersampling => Some(Box::new(RandomUnderSampler)),
        Method::RandomOversampling => Some(Box::new(RandomOverSampler)),
        Method::Smote => Some(Box::new(Smote::new(config.k_neighbors))),
        Method::Adasyn => Some(Box::new(Adasyn::new(config.k_neighbors))),
        Method::Baseline | Method::Umce => None,
    }
}

/// Neighbour count for SMOTE/ADASYN on binary data: `min(5, n_classes - 1)`.
pub(crate) const DEFAULT_BINARY_NEIGHBORS: usize = 1;

/// Split into minority/majority, failing unless both classes are present.
pub(crate) fn split_classes(table: &LabeledTable, encoding: &LabelEncoding, sampler: &str) -> Result<ClassSplit> {
    let split = table.split_by_class(encoding)?;
    if split.minority.is_empty() || split.majority.is_empty() {
        return Err(UmceError::Sampling(format!(
            "{} needs two classes, got {} '{}' and {} '{}' rows",
            sampler,
            split.minority.len(),
            split.minority.label,
            split.majority.len(),
            split.majority.label
        )));
    }
    Ok(split)
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Indices of the `k` rows of `data` closest to row `query` of `data`, the
/// query itself excluded. Equal distances are ordered by row index.
pub(crate) fn nearest_neighbors(data: &Array2<f64>, query: usize, k: usize) -> Vec<usize> {
    let point = data.row(query);
    let mut distances: Vec<(usize, f64)> = data
        .rows()
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| i != query)
        .map(|(i, row)| (i, squared_distance(point, row)))
        .collect();

    distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    distances.into_iter().take(k).map(|(i, _)| i).collect()
}

/// Point on the segment from `a` to `b` at a uniform random gap in `[0, 1)`.
pub(crate) fn interpolate<R: Rng>(rng: &mut R, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Vec<f64> {
    let gap: f64 = rng.gen();
    a.iter().zip(b.iter()).map(|(&p, &n)| p + gap * (n - p)).collect()
}

/// `base` followed by `synthetic` rows, all of the latter labelled `label`.
pub(crate) fn append_synthetic(
    base: &LabeledTable,
    synthetic: Vec<f64>,
    n_synthetic: usize,
    label: &str,
) -> Result<LabeledTable> {
    let generated = Array2::from_shape_vec((n_synthetic, base.n_features()), synthetic)
        .map_err(|e| UmceError::Sampling(e.to_string()))?;
    let extra = LabeledTable::new(
        base.feature_names.clone(),
        base.label_column.clone(),
        generated,
        vec![label.to_string(); n_synthetic],
    )?;
    base.concat(&extra)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// `n_neg` negatives around the origin and `n_pos` positives around
    /// (10, 10); row `i` of each class is offset by `i`.
    pub fn imbalanced(n_neg: usize, n_pos: usize) -> LabeledTable {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_neg {
            data.extend_from_slice(&[i as f64 * 0.1, (i % 3) as f64 * 0.1]);
            labels.push("negative".to_string());
        }
        for i in 0..n_pos {
            data.extend_from_slice(&[10.0 + i as f64 * 0.1, 10.0 - (i % 2) as f64 * 0.1]);
            labels.push("positive".to_string());
        }
        LabeledTable::new(
            vec!["f0".into(), "f1".into()],
            "Class",
            Array2::from_shape_vec((n_neg + n_pos, 2), data).unwrap(),
            labels,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nearest_neighbors_skip_query_and_sort_by_distance() {
        let data = array![[0.0, 0.0], [3.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
        assert_eq!(nearest_neighbors(&data, 0, 2), vec![2, 3]);
        assert_eq!(nearest_neighbors(&data, 2, 1), vec![3]);
    }

    #[test]
    fn test_sampler_for_method() {
        let config = SamplingConfig::default();
        assert!(sampler_for(Method::Baseline, &config).is_none());
        assert!(sampler_for(Method::Umce, &config).is_none());
        assert_eq!(sampler_for(Method::Smote, &config).unwrap().name(), "smote");
    }

    #[test]
    fn test_single_class_table_is_rejected() {
        let table = test_support::imbalanced(5, 0);
        let res = split_classes(&table, &LabelEncoding::default(), "test");
        assert!(matches!(res, Err(UmceError::Sampling(_))));
    }
}
