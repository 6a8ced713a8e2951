//! Model artifact persistence
//!
//! A trained classifier ships together with the scaler it was trained
//! behind, so inference applies the exact transformation seen during
//! training. Both are wrapped in a checksummed binary envelope.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{AffordError, Result};
use crate::preprocessing::StandardScaler;
use crate::training::LogisticRegression;

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,
    /// Model version
    pub version: String,
    /// Training timestamp (ISO 8601)
    pub trained_at: String,
    /// Feature names in training order
    pub feature_names: Vec<String>,
    /// Target name
    pub target_name: String,
    /// Model type
    pub model_type: String,
    /// Hyperparameters
    pub hyperparameters: HashMap<String, String>,
    /// Training metrics
    pub metrics: HashMap<String, f64>,
}

impl ModelMetadata {
    /// Create new metadata with name, stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            trained_at: Utc::now().to_rfc3339(),
            feature_names: Vec::new(),
            target_name: "target".to_string(),
            model_type: "logistic_regression".to_string(),
            hyperparameters: HashMap::new(),
            metrics: HashMap::new(),
        }
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set feature names
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_names = features;
        self
    }

    /// Set target name
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_name = target.into();
        self
    }

    /// Add hyperparameter
    pub fn add_hyperparameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hyperparameters.insert(key.into(), value.into());
        self
    }

    /// Add metric
    pub fn add_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// On-disk envelope around a serialized artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedModel {
    /// Magic bytes for format detection
    magic: [u8; 4],
    /// Format version
    format_version: u32,
    /// Model metadata
    metadata: ModelMetadata,
    /// Serialized artifact data
    payload: Vec<u8>,
    /// Checksum for integrity verification
    checksum: u64,
}

impl SavedModel {
    const MAGIC: [u8; 4] = [b'A', b'F', b'D', b'M'];
    const VERSION: u32 = 1;

    fn new(metadata: ModelMetadata, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&payload);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            payload,
            checksum,
        }
    }

    /// FNV-1a over the payload bytes
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.payload) == self.checksum
    }
}

/// A trained classifier bundled with its fitted scaler.
///
/// Raw feature rows go in, scaled rows feed the model. Persisting the
/// pair as one unit is what makes a loaded model reproduce training-time
/// predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// The trained classifier
    pub model: LogisticRegression,
    /// Scaler fitted on the training partition
    pub scaler: StandardScaler,
}

impl ModelArtifact {
    /// Bundle a trained model with its scaler
    pub fn new(model: LogisticRegression, scaler: StandardScaler) -> Self {
        Self { model, scaler }
    }

    /// Predict class labels for raw (unscaled) feature rows
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.model.predict(&scaled)
    }

    /// Predict positive-class probabilities for raw feature rows
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.model.predict_proba(&scaled)
    }

    /// Write the artifact to `path`, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>, metadata: ModelMetadata) -> Result<()> {
        let path = path.as_ref();

        let payload = bincode::serialize(self).map_err(|e| {
            AffordError::SerializationError(format!("failed to serialize artifact: {}", e))
        })?;
        let envelope = SavedModel::new(metadata, payload);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)
            .map_err(|e| AffordError::DataError(format!("{}: {}", path.display(), e)))?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, &envelope).map_err(|e| {
            AffordError::SerializationError(format!("failed to write {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Load an artifact and its metadata from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ModelMetadata)> {
        let path = path.as_ref();

        let file = File::open(path)
            .map_err(|e| AffordError::DataError(format!("{}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);

        let envelope: SavedModel = bincode::deserialize_from(reader).map_err(|e| {
            AffordError::SerializationError(format!("failed to read {}: {}", path.display(), e))
        })?;

        if envelope.magic != SavedModel::MAGIC {
            return Err(AffordError::SerializationError(format!(
                "{} is not an affordability model file",
                path.display()
            )));
        }
        if envelope.format_version > SavedModel::VERSION {
            return Err(AffordError::SerializationError(format!(
                "unsupported format version {}",
                envelope.format_version
            )));
        }
        if !envelope.verify_checksum() {
            return Err(AffordError::SerializationError(
                "checksum mismatch, file may be corrupted".to_string(),
            ));
        }

        let artifact: ModelArtifact = bincode::deserialize(&envelope.payload).map_err(|e| {
            AffordError::SerializationError(format!("failed to deserialize artifact: {}", e))
        })?;

        Ok((artifact, envelope.metadata))
    }
}
