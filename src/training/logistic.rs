//! Logistic regression for binary classification

use crate::error::{AffordError, Result};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

const MAX_STEP_HALVINGS: usize = 20;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Falls back to regularized solve if matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    // Not positive definite, add a small ridge and retry
                    let mut a_reg = a.clone();
                    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
                    for k in 0..n {
                        a_reg[[k, k]] += ridge;
                    }
                    return cholesky_solve_inner(&a_reg, b);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Inner Cholesky solve (no retry) for regularized matrix
fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None; // Still not PD, caller falls back to Gauss-Jordan
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Simple matrix inversion for small matrices using Gauss-Jordan elimination (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Create augmented matrix [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    // Gauss-Jordan elimination
    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        // Swap rows
        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        // Check for singularity
        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        // Scale pivot row
        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        // Eliminate column
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    // Extract inverse from right half
    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }

    Some(inv)
}

/// L2-regularized logistic regression for binary classification.
///
/// Fitted with damped Newton iterations on the penalized negative
/// log-likelihood. Regularization uses the inverse-strength convention:
/// the penalty on the weights is `1 / c`, and the intercept is never
/// penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularization strength (smaller means stronger penalty)
    pub c: f64,
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sigmoid function
    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Penalized negative log-likelihood, evaluated in overflow-safe form
    fn penalized_nll(
        x: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        bias: f64,
        lambda: f64,
    ) -> f64 {
        let z = x.dot(weights) + bias;
        let data_loss: f64 = z
            .iter()
            .zip(y.iter())
            .map(|(&zi, &yi)| zi.max(0.0) + (-zi.abs()).exp().ln_1p() - yi * zi)
            .sum();
        data_loss + 0.5 * lambda * weights.mapv(|w| w * w).sum()
    }

    /// Fit the model with damped Newton iterations.
    ///
    /// Labels must be 0 or 1. Returns `ConvergenceError` when the gradient
    /// norm has not dropped below `tol` within `max_iter` iterations.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(AffordError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(AffordError::ValidationError(
                "cannot fit on an empty dataset".to_string(),
            ));
        }
        if !(self.c > 0.0) {
            return Err(AffordError::InvalidParameter {
                name: "c".to_string(),
                value: self.c.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(AffordError::ValidationError(
                "labels must be 0 or 1 for binary classification".to_string(),
            ));
        }

        let lambda = 1.0 / self.c;
        let n_params = n_features + 1;

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;
        let mut converged = false;

        for _iter in 0..self.max_iter {
            let z = x.dot(&weights) + bias;
            let p = Self::sigmoid(&z);
            let errors = &p - y;

            // Gradient over [weights, bias]; the bias term carries no penalty
            let mut gradient: Array1<f64> = Array1::zeros(n_params);
            for j in 0..n_features {
                gradient[j] = x.column(j).dot(&errors) + lambda * weights[j];
            }
            gradient[n_features] = errors.sum();

            let grad_norm = gradient.mapv(|v| v * v).sum().sqrt();
            if grad_norm < self.tol {
                converged = true;
                break;
            }

            // Hessian: X^T S X on the weight block plus the lambda ridge,
            // bordered by the bias row/column
            let s_diag = p.mapv(|pi| pi * (1.0 - pi));
            let mut hessian: Array2<f64> = Array2::zeros((n_params, n_params));
            for j in 0..n_features {
                for k in j..n_features {
                    let mut sum = 0.0;
                    for i in 0..n_samples {
                        sum += s_diag[i] * x[[i, j]] * x[[i, k]];
                    }
                    hessian[[j, k]] = sum;
                    hessian[[k, j]] = sum;
                }
                hessian[[j, j]] += lambda;
            }
            for j in 0..n_features {
                let mut sum = 0.0;
                for i in 0..n_samples {
                    sum += s_diag[i] * x[[i, j]];
                }
                hessian[[j, n_features]] = sum;
                hessian[[n_features, j]] = sum;
            }
            hessian[[n_features, n_features]] = s_diag.sum();

            let delta = if let Some(d) = cholesky_solve(&hessian, &gradient) {
                d
            } else {
                match matrix_inverse(&hessian) {
                    Some(inv) => inv.dot(&gradient),
                    None => {
                        return Err(AffordError::ComputationError(
                            "Hessian is singular, cannot take a Newton step".to_string(),
                        ));
                    }
                }
            };
            let delta_w = delta.slice(s![..n_features]).to_owned();
            let delta_b = delta[n_features];

            // Halve the step until the penalized loss stops increasing
            let current_loss = Self::penalized_nll(x, y, &weights, bias, lambda);
            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_STEP_HALVINGS {
                let w_cand = &weights - &delta_w.mapv(|v| v * step);
                let b_cand = bias - step * delta_b;
                if Self::penalized_nll(x, y, &w_cand, b_cand, lambda) <= current_loss {
                    weights = w_cand;
                    bias = b_cand;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                // Loss differences at this step size are float noise
                weights = &weights - &delta_w.mapv(|v| v * step);
                bias -= step * delta_b;
            }
        }

        if !converged {
            return Err(AffordError::ConvergenceError {
                iterations: self.max_iter,
            });
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(self)
    }

    /// Predict probabilities for the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AffordError::ModelNotFitted);
        }

        let coefficients = self.coefficients.as_ref().unwrap();
        if x.ncols() != coefficients.len() {
            return Err(AffordError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let intercept = self.intercept.unwrap_or(0.0);

        let linear = x.dot(coefficients) + intercept;
        Ok(Self::sigmoid(&linear))
    }

    /// Predict class labels (0.0 or 1.0)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}
