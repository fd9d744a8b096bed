use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data_handling::{LabelEncoding, LabeledTable};
use crate::error::{Result, UmceError};
use crate::sampling::{
    append_synthetic, interpolate, nearest_neighbors, split_classes, Sampler, DEFAULT_BINARY_NEIGHBORS,
};

/// Synthetic Minority Over-sampling Technique.
///
/// Generates `|majority| - |minority|` minority rows, each on the segment
/// between a random minority row and one of its `k` nearest minority
/// neighbours.
#[derive(Debug, Clone, Copy)]
pub struct Smote {
    k_neighbors: usize,
}

impl Smote {
    pub fn new(k_neighbors: Option<usize>) -> Self {
        Self {
            k_neighbors: k_neighbors.unwrap_or(DEFAULT_BINARY_NEIGHBORS).max(1),
        }
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Sampler for Smote {
    fn name(&self) -> &'static str {
        "smote"
    }

    fn resample(&self, table: &LabeledTable, encoding: &LabelEncoding, seed: u64) -> Result<LabeledTable> {
        let classes = split_classes(table, encoding, self.name())?;
        let minority = &classes.minority.table.x;
        let n_minority = minority.nrows();
        if n_minority <= self.k_neighbors {
            return Err(UmceError::Sampling(format!(
                "smote needs more than {} minority rows, got {}",
                self.k_neighbors, n_minority
            )));
        }

        let neighbors: Vec<Vec<usize>> = (0..n_minority)
            .map(|i| nearest_neighbors(minority, i, self.k_neighbors))
            .collect();

        let n_synthetic = classes.majority.len().saturating_sub(n_minority);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut synthetic = Vec::with_capacity(n_synthetic * table.n_features());
        for _ in 0..n_synthetic {
            let row = rng.gen_range(0..n_minority);
            let neighbor = neighbors[row][rng.gen_range(0..neighbors[row].len())];
            synthetic.extend(interpolate(&mut rng, minority.row(row), minority.row(neighbor)));
        }

        log::trace!("smote generated {} '{}' rows", n_synthetic, classes.minority.label);
        let base = classes.majority.table.concat(&classes.minority.table)?;
        append_synthetic(&base, synthetic, n_synthetic, &classes.minority.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::test_support::imbalanced;

    #[test]
    fn test_smote_balances_classes() {
        let table = imbalanced(25, 5);
        let out = Smote::default()
            .resample(&table, &LabelEncoding::default(), 42)
            .unwrap();
        let counts = out.class_counts();
        assert_eq!(counts["negative"], 25);
        assert_eq!(counts["positive"], 25);
    }

    #[test]
    fn test_synthetic_rows_stay_inside_minority_hull() {
        let table = imbalanced(25, 5);
        let out = Smote::new(Some(2))
            .resample(&table, &LabelEncoding::default(), 7)
            .unwrap();
        for (row, label) in out.x.rows().into_iter().zip(&out.labels).skip(30) {
            assert_eq!(label, "positive");
            assert!(row[0] >= 10.0 && row[0] <= 10.4 + 1e-9);
            assert!(row[1] >= 9.9 - 1e-9 && row[1] <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn test_too_few_minority_rows() {
        let table = imbalanced(10, 1);
        assert!(matches!(
            Smote::default().resample(&table, &LabelEncoding::default(), 42),
            Err(UmceError::Sampling(_))
        ));
    }
}
