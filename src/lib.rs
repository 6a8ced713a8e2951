//! Affordability - Used-car affordability model pipeline
//!
//! This crate trains, evaluates and persists a binary classifier that
//! predicts whether a used car is affordable from its age and mileage:
//! - CSV loading into feature and label arrays
//! - Seeded train/test splitting and train-only standardization
//! - L2-regularized logistic regression fitted by damped Newton steps
//! - Run tracking with metrics, parameters and artifact paths
//! - A checksummed on-disk artifact bundling model and scaler
//!
//! # Modules
//!
//! ## Core Pipeline
//! - [`data`] - CSV loading and column extraction
//! - [`preprocessing`] - Feature standardization
//! - [`training`] - Splitting, the classifier and evaluation metrics
//! - [`pipeline`] - The end-to-end train/evaluate/persist sequence
//!
//! ## Infrastructure
//! - [`tracking`] - Run records, metrics and artifact logging
//! - [`artifact`] - Model + scaler persistence
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core pipeline
pub mod data;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

// Infrastructure
pub mod artifact;
pub mod tracking;

// Services
pub mod cli;

pub use error::{AffordError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{AffordError, Result};

    // Data
    pub use crate::data::{load_affordability, load_csv, Dataset};

    // Preprocessing
    pub use crate::preprocessing::StandardScaler;

    // Training
    pub use crate::training::{train_test_split, ClassificationMetrics, LogisticRegression};

    // Pipeline
    pub use crate::pipeline::{train_eval_persist, PipelineConfig, TrainOutcome};

    // Tracking
    pub use crate::tracking::{LocalRunStore, NoopTracker, RunRecord, RunStatus, RunTracker};

    // Artifacts
    pub use crate::artifact::{ModelArtifact, ModelMetadata};
}
