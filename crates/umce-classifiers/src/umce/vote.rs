use std::collections::BTreeMap;

use crate::error::{Result, UmceError};

/// Hard labels aligned index-wise with a test set.
pub type PredictionVector = Vec<usize>;

/// Reduce `k` prediction vectors to one by per-position majority vote.
///
/// Ties resolve to the lowest label value, so with the `{0, 1}` encoding an
/// even split between the classes votes for the negative class.
///
/// # Errors
///
/// * `EmptyEnsemble` when `predictions` is empty.
/// * `DegenerateInput` when the vectors differ in length.
pub fn aggregate(predictions: &[PredictionVector]) -> Result<PredictionVector> {
    let first = predictions.first().ok_or(UmceError::EmptyEnsemble(None))?;
    let n_rows = first.len();

    if let Some((idx, bad)) = predictions
        .iter()
        .enumerate()
        .find(|(_, p)| p.len() != n_rows)
    {
        return Err(UmceError::DegenerateInput(format!(
            "prediction vector {} has {} rows, expected {}",
            idx,
            bad.len(),
            n_rows
        )));
    }

    let mut consensus = Vec::with_capacity(n_rows);
    let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
    for row in 0..n_rows {
        votes.clear();
        for vector in predictions {
            *votes.entry(vector[row]).or_insert(0) += 1;
        }

        // Ascending label order: only a strictly larger count replaces the
        // current winner, which keeps the lowest label on ties.
        let mut winner = (0usize, 0usize);
        for (&label, &count) in votes.iter() {
            if count > winner.1 {
                winner = (label, count);
            }
        }
        consensus.push(winner.0);
    }

    Ok(consensus)
}
