use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data_handling::{LabelEncoding, LabeledTable};
use crate::error::{Result, UmceError};
use crate::sampling::{
    append_synthetic, interpolate, nearest_neighbors, split_classes, Sampler, DEFAULT_BINARY_NEIGHBORS,
};

/// Adaptive synthetic sampling.
///
/// Minority rows surrounded by more majority rows get a larger share of the
/// `|majority| - |minority|` synthetic rows.
#[derive(Debug, Clone, Copy)]
pub struct Adasyn {
    k_neighbors: usize,
}

impl Adasyn {
    pub fn new(k_neighbors: Option<usize>) -> Self {
        Self {
            k_neighbors: k_neighbors.unwrap_or(DEFAULT_BINARY_NEIGHBORS).max(1),
        }
    }
}

impl Default for Adasyn {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Sampler for Adasyn {
    fn name(&self) -> &'static str {
        "adasyn"
    }

    fn resample(&self, table: &LabeledTable, encoding: &LabelEncoding, seed: u64) -> Result<LabeledTable> {
        let classes = split_classes(table, encoding, self.name())?;
        let n_minority = classes.minority.len();
        if n_minority <= self.k_neighbors {
            return Err(UmceError::Sampling(format!(
                "adasyn needs more than {} minority rows, got {}",
                self.k_neighbors, n_minority
            )));
        }

        // Majority rows first, so index >= n_majority marks a minority row.
        let base = classes.majority.table.concat(&classes.minority.table)?;
        let n_majority = classes.majority.len();

        let difficulty: Vec<f64> = (n_majority..base.nrows())
            .map(|i| {
                let hits = nearest_neighbors(&base.x, i, self.k_neighbors)
                    .into_iter()
                    .filter(|&j| j < n_majority)
                    .count();
                hits as f64 / self.k_neighbors as f64
            })
            .collect();
        let total: f64 = difficulty.iter().sum();
        if total == 0.0 {
            return Err(UmceError::Sampling(
                "adasyn: no minority row has a majority neighbour".to_string(),
            ));
        }

        let minority = &classes.minority.table.x;
        let neighbors: Vec<Vec<usize>> = (0..n_minority)
            .map(|i| nearest_neighbors(minority, i, self.k_neighbors))
            .collect();

        let gap = n_majority.saturating_sub(n_minority) as f64;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut synthetic = Vec::new();
        let mut n_synthetic = 0;
        for (row, weight) in difficulty.iter().enumerate() {
            let n_row = (weight / total * gap).round() as usize;
            for _ in 0..n_row {
                let neighbor = neighbors[row][rng.gen_range(0..neighbors[row].len())];
                synthetic.extend(interpolate(&mut rng, minority.row(row), minority.row(neighbor)));
            }
            n_synthetic += n_row;
        }

        log::trace!("adasyn generated {} '{}' rows", n_synthetic, classes.minority.label);
        append_synthetic(&base, synthetic, n_synthetic, &classes.minority.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::LabeledTable;
    use ndarray::array;

    #[test]
    fn test_adasyn_focuses_on_hard_rows() {
        // Positives at 0.0 and 0.1 sit next to negatives, 5.0 and 5.1 do not.
        let table = LabeledTable::new(
            vec!["f0".into()],
            "Class",
            array![[0.05], [0.15], [1.0], [2.0], [3.0], [4.0], [0.0], [0.1], [5.0], [5.1]],
            ["negative"; 6]
                .iter()
                .chain(["positive"; 4].iter())
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();

        let out = Adasyn::default()
            .resample(&table, &LabelEncoding::default(), 42)
            .unwrap();
        assert_eq!(out.class_counts()["positive"], 6);
        for row in out.x.rows().into_iter().skip(10) {
            assert!(row[0] <= 0.1 + 1e-9);
        }
    }

    #[test]
    fn test_separated_classes_fail() {
        let table = crate::sampling::test_support::imbalanced(20, 4);
        assert!(matches!(
            Adasyn::default().resample(&table, &LabelEncoding::default(), 42),
            Err(UmceError::Sampling(_))
        ));
    }
}
