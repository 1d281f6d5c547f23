//! Seeded train/test row partitioning.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::common::error::{LensError, LensResult};

use super::domain::SplitConfig;

/// Row indices assigned to fitting and to scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..num_rows` with the configured seed and hold out the head.
///
/// `ceil(num_rows * test_fraction)` rows are held out; both sides must be
/// non-empty.
pub fn train_test_split(num_rows: usize, cfg: &SplitConfig) -> LensResult<Partition> {
    let n_test = (num_rows as f64 * cfg.test_fraction).ceil() as usize;
    let n_train = num_rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(LensError::insufficient(format!(
            "{num_rows} rows cannot be split into non-empty train and test sets"
        )));
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cfg.seed);
    let mut indices: Vec<usize> = (0..num_rows).collect();
    for i in 0..num_rows {
        let j = rng.gen_range(i..num_rows);
        indices.swap(i, j);
    }

    let train = indices.split_off(n_test);
    Ok(Partition {
        train,
        test: indices,
    })
}
