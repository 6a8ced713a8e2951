//! Evaluation metrics for binary classifiers

use crate::error::{AffordError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for a binary classifier on one evaluation set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Fraction of correct predictions, in [0, 1]
    pub accuracy: f64,
    /// Precision for the positive class
    pub precision: f64,
    /// Recall for the positive class
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1_score: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compute metrics from true and predicted labels.
    ///
    /// Labels above 0.5 count as the positive class. Precision, recall and
    /// F1 fall back to 0.0 when their denominators are empty.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(AffordError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(AffordError::ValidationError(
                "cannot compute metrics on an empty evaluation set".to_string(),
            ));
        }

        let correct: usize = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        let accuracy = correct as f64 / y_true.len() as f64;

        let (tp, fp, _tn, fn_) = confusion_counts(y_true, y_pred);

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy,
            precision,
            recall,
            f1_score,
            n_samples: y_true.len(),
        })
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_bool = *t > 0.5;
        let p_bool = *p > 0.5;

        match (t_bool, p_bool) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}
