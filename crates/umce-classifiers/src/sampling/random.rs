use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data_handling::{LabelEncoding, LabeledTable};
use crate::error::Result;
use crate::sampling::{split_classes, Sampler};

/// Draws `|minority|` majority rows without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUnderSampler;

/// Draws `|majority|` minority rows with replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOverSampler;

impl Sampler for RandomUnderSampler {
    fn name(&self) -> &'static str {
        "random_undersampling"
    }

    fn resample(&self, table: &LabeledTable, encoding: &LabelEncoding, seed: u64) -> Result<LabeledTable> {
        let classes = split_classes(table, encoding, self.name())?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let keep = sample(&mut rng, classes.majority.len(), classes.minority.len()).into_vec();
        log::trace!(
            "undersampling '{}' from {} to {} rows",
            classes.majority.label,
            classes.majority.len(),
            keep.len()
        );
        classes
            .majority
            .table
            .select_rows(&keep)
            .concat(&classes.minority.table)
    }
}

impl Sampler for RandomOverSampler {
    fn name(&self) -> &'static str {
        "random_oversampling"
    }

    fn resample(&self, table: &LabeledTable, encoding: &LabelEncoding, seed: u64) -> Result<LabeledTable> {
        let classes = split_classes(table, encoding, self.name())?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let n_minority = classes.minority.len();
        let drawn: Vec<usize> = (0..classes.majority.len())
            .map(|_| rng.gen_range(0..n_minority))
            .collect();
        log::trace!(
            "oversampling '{}' from {} to {} rows",
            classes.minority.label,
            n_minority,
            drawn.len()
        );
        classes
            .majority
            .table
            .concat(&classes.minority.table.select_rows(&drawn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::test_support::imbalanced;

    #[test]
    fn test_undersampling_balances_to_minority_size() {
        let table = imbalanced(30, 6);
        let out = RandomUnderSampler
            .resample(&table, &LabelEncoding::default(), 42)
            .unwrap();
        let counts = out.class_counts();
        assert_eq!(counts["negative"], 6);
        assert_eq!(counts["positive"], 6);

        // No majority row is drawn twice.
        let mut firsts: Vec<u64> = out
            .x
            .rows()
            .into_iter()
            .zip(&out.labels)
            .filter(|(_, l)| l.as_str() == "negative")
            .map(|(r, _)| (r[0] * 10.0).round() as u64)
            .collect();
        firsts.sort_unstable();
        firsts.dedup();
        assert_eq!(firsts.len(), 6);
    }

    #[test]
    fn test_oversampling_balances_to_majority_size() {
        let table = imbalanced(30, 6);
        let out = RandomOverSampler
            .resample(&table, &LabelEncoding::default(), 42)
            .unwrap();
        let counts = out.class_counts();
        assert_eq!(counts["negative"], 30);
        assert_eq!(counts["positive"], 30);
        assert_eq!(out.feature_names, table.feature_names);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let table = imbalanced(20, 4);
        let enc = LabelEncoding::default();
        let a = RandomUnderSampler.resample(&table, &enc, 9).unwrap();
        let b = RandomUnderSampler.resample(&table, &enc, 9).unwrap();
        assert_eq!(a, b);
    }
}
