//! End-to-end training pipeline
//!
//! One call takes raw feature and label arrays through the whole
//! sequence: seeded split, scaling fitted on the training partition,
//! model fitting, held-out evaluation, metric logging and artifact
//! persistence. Any failure aborts the sequence before metrics are
//! logged and leaves the tracked run open.

use std::path::PathBuf;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artifact::{ModelArtifact, ModelMetadata};
use crate::error::{AffordError, Result};
use crate::preprocessing::StandardScaler;
use crate::tracking::RunTracker;
use crate::training::{train_test_split, ClassificationMetrics, LogisticRegression};

/// Metric name for the configured training fraction
pub const METRIC_TRAINING_SET_PERCENTAGE: &str = "Training_Set_Percentage";
/// Metric name for held-out accuracy
pub const METRIC_ACCURACY: &str = "Accuracy";

/// Configuration for one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of rows used for training, strictly between 0 and 1
    pub train_fraction: f64,
    /// Seed for the split shuffle
    pub seed: u64,
    /// Inverse regularization strength of the classifier
    pub c: f64,
    /// Maximum fitting iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    /// Where the trained artifact is written
    pub artifact_path: PathBuf,
    /// Feature names, in column order
    pub feature_names: Vec<String>,
    /// Target name
    pub target_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.75,
            seed: 42,
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            artifact_path: PathBuf::from("outputs/model.bin"),
            feature_names: vec!["Age".to_string(), "KM".to_string()],
            target_name: "Affordable".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the training fraction
    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    /// Set the shuffle seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set the maximum fitting iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the artifact output path
    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// Set the feature names recorded in artifact metadata
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Set the target name recorded in artifact metadata
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }
}

/// Everything a finished training run produces
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// The trained classifier
    pub model: LogisticRegression,
    /// Scaler fitted on the training partition
    pub scaler: StandardScaler,
    /// Held-out evaluation metrics
    pub metrics: ClassificationMetrics,
    /// Number of training rows
    pub n_train: usize,
    /// Number of test rows
    pub n_test: usize,
    /// Where the artifact was written
    pub artifact_path: PathBuf,
}

impl TrainOutcome {
    /// Held-out accuracy of the trained model
    pub fn accuracy(&self) -> f64 {
        self.metrics.accuracy
    }
}

/// Train, evaluate and persist an affordability classifier.
///
/// Rows are shuffled with the configured seed and split without
/// stratification; `floor(n * train_fraction)` rows train the model and
/// the rest evaluate it. The scaler is fitted on the training partition
/// only and applied to both. After evaluation the training fraction and
/// accuracy are logged to `tracker`, the model and scaler are written as
/// one artifact, and the run is completed.
///
/// Every failure returns before the metric logging step, so an aborted
/// run carries no metrics and is never marked complete.
pub fn train_eval_persist(
    features: &Array2<f64>,
    labels: &Array1<f64>,
    config: &PipelineConfig,
    tracker: &dyn RunTracker,
) -> Result<TrainOutcome> {
    let n_samples = features.nrows();
    let n_features = features.ncols();

    if n_samples != labels.len() {
        return Err(AffordError::ShapeError {
            expected: format!("{} label rows", n_samples),
            actual: format!("{} label rows", labels.len()),
        });
    }
    if n_features != config.feature_names.len() {
        return Err(AffordError::ShapeError {
            expected: format!("{} feature columns", config.feature_names.len()),
            actual: format!("{} feature columns", n_features),
        });
    }
    debug!(n_samples, n_features, "starting training run");

    let split = train_test_split(n_samples, config.train_fraction, config.seed)?;
    let (x_train, x_test, y_train, y_test) = split.take(features, labels);
    info!(
        n_train = split.n_train(),
        n_test = split.n_test(),
        train_fraction = config.train_fraction,
        "split dataset"
    );

    let mut scaler = StandardScaler::new();
    let x_train_scaled = scaler.fit_transform(&x_train)?;
    let x_test_scaled = scaler.transform(&x_test)?;

    let mut model = LogisticRegression::new()
        .with_c(config.c)
        .with_max_iter(config.max_iter)
        .with_tol(config.tol);
    model.fit(&x_train_scaled, &y_train)?;

    let y_pred = model.predict(&x_test_scaled)?;
    let metrics = ClassificationMetrics::compute(&y_test, &y_pred)?;
    info!(accuracy = metrics.accuracy, "evaluated model");

    tracker.log_metric(METRIC_TRAINING_SET_PERCENTAGE, config.train_fraction)?;
    tracker.log_metric(METRIC_ACCURACY, metrics.accuracy)?;

    let metadata = ModelMetadata::new("affordability")
        .with_features(config.feature_names.clone())
        .with_target(config.target_name.clone())
        .add_hyperparameter("c", config.c.to_string())
        .add_hyperparameter("max_iter", config.max_iter.to_string())
        .add_hyperparameter("tol", config.tol.to_string())
        .add_hyperparameter("train_fraction", config.train_fraction.to_string())
        .add_hyperparameter("seed", config.seed.to_string())
        .add_metric(METRIC_ACCURACY, metrics.accuracy);

    let artifact = ModelArtifact::new(model, scaler);
    artifact.save(&config.artifact_path, metadata)?;
    tracker.log_artifact(&config.artifact_path.to_string_lossy())?;
    info!(path = %config.artifact_path.display(), "saved model artifact");

    tracker.complete()?;

    Ok(TrainOutcome {
        model: artifact.model,
        scaler: artifact.scaler,
        metrics,
        n_train: split.n_train(),
        n_test: split.n_test(),
        artifact_path: config.artifact_path.clone(),
    })
}
