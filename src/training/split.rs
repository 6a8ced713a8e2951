//! Seeded train/test partitioning

use crate::error::{AffordError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Index sets for a single train/test partition
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    /// Number of training rows
    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    /// Number of test rows
    pub fn n_test(&self) -> usize {
        self.test_indices.len()
    }

    /// Gather rows of `x` and `y` into owned train/test partitions
    pub fn take(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
        let x_train = x.select(Axis(0), &self.train_indices);
        let x_test = x.select(Axis(0), &self.test_indices);
        let y_train = y.select(Axis(0), &self.train_indices);
        let y_test = y.select(Axis(0), &self.test_indices);
        (x_train, x_test, y_train, y_test)
    }
}

/// Shuffle `0..n_samples` with a seeded RNG and split off
/// `floor(n_samples * train_fraction)` rows for training; the rest are test.
///
/// `train_fraction` must lie strictly between 0 and 1. The split is
/// unstratified, so class balance across partitions is not guaranteed.
pub fn train_test_split(n_samples: usize, train_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(AffordError::InvalidParameter {
            name: "train_fraction".to_string(),
            value: train_fraction.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }
    if n_samples < 2 {
        return Err(AffordError::ValidationError(format!(
            "need at least 2 samples to split, got {}",
            n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = (n_samples as f64 * train_fraction).floor() as usize;
    if n_train == 0 || n_train == n_samples {
        return Err(AffordError::ValidationError(format!(
            "train_fraction {} leaves an empty partition for {} samples",
            train_fraction, n_samples
        )));
    }

    Ok(TrainTestSplit {
        train_indices: indices[..n_train].to_vec(),
        test_indices: indices[n_train..].to_vec(),
    })
}
