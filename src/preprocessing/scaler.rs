//! Feature scaling implementations

use crate::error::{AffordError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaler (z-score normalization): (x - mean) / std
///
/// Statistics are computed per feature column from the data passed to
/// [`fit`](StandardScaler::fit), so fitting on the training partition and
/// transforming both partitions applies training statistics everywhere.
/// Standard deviation uses one delta degree of freedom; a zero-spread
/// column stores a scale of 1.0 so transforming it only centers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new unfitted scaler
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
            is_fitted: false,
        }
    }

    /// Fit per-column mean and standard deviation
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(AffordError::ValidationError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AffordError::ValidationError("cannot fit scaler on empty data".to_string()))?;
        // ddof 1; a single row yields NaN, treated like zero spread
        let std = x
            .std_axis(Axis(0), 1.0)
            .mapv(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s });

        self.mean = Some(mean);
        self.std = Some(std);
        self.is_fitted = true;
        Ok(self)
    }

    /// Standardize with the fitted statistics
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AffordError::ModelNotFitted);
        }

        let mean = self.mean.as_ref().unwrap();
        let std = self.std.as_ref().unwrap();

        if x.ncols() != mean.len() {
            return Err(AffordError::ShapeError {
                expected: format!("{} feature columns", mean.len()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        let centered = x - &mean.clone().insert_axis(Axis(0));
        Ok(centered / &std.clone().insert_axis(Axis(0)))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Map standardized values back to the original feature scale
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AffordError::ModelNotFitted);
        }

        let mean = self.mean.as_ref().unwrap();
        let std = self.std.as_ref().unwrap();

        if x.ncols() != mean.len() {
            return Err(AffordError::ShapeError {
                expected: format!("{} feature columns", mean.len()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        let rescaled = x * &std.clone().insert_axis(Axis(0));
        Ok(rescaled + &mean.clone().insert_axis(Axis(0)))
    }

    /// Fitted per-column means
    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Fitted per-column standard deviations
    pub fn std(&self) -> Option<&Array1<f64>> {
        self.std.as_ref()
    }

    /// Whether the scaler has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
