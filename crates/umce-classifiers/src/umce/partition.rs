use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data_handling::{ClassPartition, LabeledTable};
use crate::error::{Result, UmceError};

/// One slice of the shuffled majority class.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub index: usize,
    /// Row positions in the majority partition, in shuffled order.
    pub rows: Vec<usize>,
    pub table: LabeledTable,
}

impl Fold {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// This fold's majority rows followed by every minority row.
    pub fn training_set(&self, minority: &ClassPartition) -> Result<LabeledTable> {
        self.table.concat(&minority.table)
    }
}

/// `k = max(1, round(n_majority / n_minority))`, rounding halves to even.
pub fn fold_count(n_majority: usize, n_minority: usize) -> Result<usize> {
    if n_minority == 0 {
        return Err(UmceError::DegenerateInput(
            "minority class is empty, imbalance ratio is undefined".to_string(),
        ));
    }
    let ratio = n_majority as f64 / n_minority as f64;
    Ok((ratio.round_ties_even() as usize).max(1))
}

/// Split `0..n` into `k` contiguous chunks whose sizes differ by at most one;
/// the first `n % k` chunks get the extra element.
pub fn split_sizes(n: usize, k: usize) -> Vec<usize> {
    let base = n / k;
    let extra = n % k;
    (0..k).map(|i| base + usize::from(i < extra)).collect()
}

/// Shuffle the majority class with `seed` and cut it into `round(IR)` folds.
///
/// Folds cover every majority row exactly once. When the majority class has
/// fewer rows than folds, the trailing folds are empty.
///
/// # Errors
///
/// `DegenerateInput` if the minority partition is empty.
pub fn partition(
    majority: &ClassPartition,
    minority: &ClassPartition,
    seed: u64,
) -> Result<Vec<Fold>> {
    let k = fold_count(majority.len(), minority.len())?;

    let mut order: Vec<usize> = (0..majority.len()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for (index, size) in split_sizes(order.len(), k).into_iter().enumerate() {
        let rows = order[start..start + size].to_vec();
        start += size;
        let table = majority.table.select_rows(&rows);
        folds.push(Fold { index, rows, table });
    }

    log::debug!(
        "partitioned {} '{}' rows into {} folds (minority '{}': {} rows)",
        majority.len(),
        majority.label,
        k,
        minority.label,
        minority.len()
    );

    Ok(folds)
}
