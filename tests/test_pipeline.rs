//! Integration tests: full train → evaluate → persist pipeline

use std::fs;
use std::sync::RwLock;

use ndarray::{array, Array1, Array2, Axis};
use tempfile::tempdir;

use affordability::artifact::ModelArtifact;
use affordability::data::load_affordability;
use affordability::error::AffordError;
use affordability::pipeline::{
    train_eval_persist, PipelineConfig, METRIC_ACCURACY, METRIC_TRAINING_SET_PERCENTAGE,
};
use affordability::tracking::{LocalRunStore, RunRecord, RunStatus, RunTracker};
use affordability::training::train_test_split;
use affordability::Result;

/// Tracker that records every call for later inspection
#[derive(Default)]
struct RecordingTracker {
    metrics: RwLock<Vec<(String, f64)>>,
    artifacts: RwLock<Vec<String>>,
    completed: RwLock<bool>,
    failed: RwLock<bool>,
}

impl RecordingTracker {
    fn new() -> Self {
        Self::default()
    }

    fn metrics(&self) -> Vec<(String, f64)> {
        self.metrics.read().unwrap().clone()
    }

    fn artifacts(&self) -> Vec<String> {
        self.artifacts.read().unwrap().clone()
    }

    fn is_completed(&self) -> bool {
        *self.completed.read().unwrap()
    }

    fn is_failed(&self) -> bool {
        *self.failed.read().unwrap()
    }
}

impl RunTracker for RecordingTracker {
    fn log_metric(&self, name: &str, value: f64) -> Result<()> {
        self.metrics.write().unwrap().push((name.to_string(), value));
        Ok(())
    }

    fn log_artifact(&self, path: &str) -> Result<()> {
        self.artifacts.write().unwrap().push(path.to_string());
        Ok(())
    }

    fn complete(&self) -> Result<()> {
        *self.completed.write().unwrap() = true;
        Ok(())
    }

    fn fail(&self) -> Result<()> {
        *self.failed.write().unwrap() = true;
        Ok(())
    }
}

fn four_row_data() -> (Array2<f64>, Array1<f64>) {
    (
        array![[10.0, 1.0], [20.0, 2.0], [30.0, 3.0], [40.0, 4.0]],
        array![1.0, 1.0, 0.0, 0.0],
    )
}

/// Cars with integer ages and mileage roughly proportional to age;
/// young cars are labeled affordable.
fn synthetic_cars(n: usize) -> (Array2<f64>, Array1<f64>) {
    let mut features = Array2::zeros((n, 2));
    let mut labels = Array1::zeros(n);
    for i in 0..n {
        let age = 1.0 + i as f64;
        let km = 12.0 * age + ((i * 7) % 5) as f64;
        features[[i, 0]] = age;
        features[[i, 1]] = km;
        labels[i] = if age < n as f64 / 2.0 { 1.0 } else { 0.0 };
    }
    (features, labels)
}

#[test]
fn test_four_row_scenario() {
    let dir = tempdir().unwrap();
    let (features, labels) = four_row_data();
    let tracker = RecordingTracker::new();
    let config = PipelineConfig::default().with_artifact_path(dir.path().join("model.bin"));

    let outcome = train_eval_persist(&features, &labels, &config, &tracker).unwrap();

    // floor(4 * 0.75) = 3 training rows
    assert_eq!(outcome.n_train, 3);
    assert_eq!(outcome.n_test, 1);
    assert!(
        outcome.accuracy() == 0.0 || outcome.accuracy() == 1.0,
        "a single test row is either right or wrong, got {}",
        outcome.accuracy()
    );

    let metrics = tracker.metrics();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].0, "Training_Set_Percentage");
    assert_eq!(metrics[0].1, 0.75);
    assert_eq!(metrics[1].0, "Accuracy");
    assert_eq!(metrics[1].1, outcome.accuracy());

    assert!(tracker.is_completed());
    assert_eq!(tracker.artifacts().len(), 1);
    assert!(outcome.artifact_path.exists());
}

#[test]
fn test_repeat_runs_are_identical() {
    let dir = tempdir().unwrap();
    let (features, labels) = synthetic_cars(16);

    let config_a = PipelineConfig::default().with_artifact_path(dir.path().join("a.bin"));
    let config_b = PipelineConfig::default().with_artifact_path(dir.path().join("b.bin"));

    let a = train_eval_persist(&features, &labels, &config_a, &RecordingTracker::new()).unwrap();
    let b = train_eval_persist(&features, &labels, &config_b, &RecordingTracker::new()).unwrap();

    assert_eq!(
        a.model.coefficients, b.model.coefficients,
        "same data, fraction and seed must give bit-identical weights"
    );
    assert_eq!(a.model.intercept, b.model.intercept);
    assert_eq!(a.accuracy(), b.accuracy());
}

#[test]
fn test_different_seed_changes_split() {
    let (features, labels) = synthetic_cars(16);
    let dir = tempdir().unwrap();

    let a = train_eval_persist(
        &features,
        &labels,
        &PipelineConfig::default().with_artifact_path(dir.path().join("a.bin")),
        &RecordingTracker::new(),
    )
    .unwrap();
    let b = train_eval_persist(
        &features,
        &labels,
        &PipelineConfig::default()
            .with_seed(7)
            .with_artifact_path(dir.path().join("b.bin")),
        &RecordingTracker::new(),
    )
    .unwrap();

    // Partition sizes are fixed by the fraction regardless of seed
    assert_eq!(a.n_train, b.n_train);
    assert_eq!(a.n_test, b.n_test);

    let split_a = train_test_split(16, 0.75, 42).unwrap();
    let split_b = train_test_split(16, 0.75, 7).unwrap();
    assert_ne!(
        split_a.train_indices, split_b.train_indices,
        "a different seed should select different training rows"
    );
}

#[test]
fn test_boundary_fractions_log_nothing() {
    let (features, labels) = four_row_data();

    for fraction in [0.0, 1.0] {
        let tracker = RecordingTracker::new();
        let config = PipelineConfig::default()
            .with_train_fraction(fraction)
            .with_artifact_path("never/written/model.bin");

        let result = train_eval_persist(&features, &labels, &config, &tracker);

        match result {
            Err(AffordError::InvalidParameter { name, .. }) => {
                assert_eq!(name, "train_fraction");
            }
            other => panic!("fraction {} must be rejected, got {:?}", fraction, other.is_ok()),
        }
        assert!(tracker.metrics().is_empty(), "no metrics after rejection");
        assert!(!tracker.is_completed());
        assert!(!tracker.is_failed(), "marking runs failed is the caller's job");
    }
}

#[test]
fn test_scaler_sees_training_rows_only() {
    let dir = tempdir().unwrap();
    let (features, labels) = synthetic_cars(12);
    let config = PipelineConfig::default()
        .with_feature_names(vec!["age".to_string(), "km".to_string()])
        .with_target_name("affordable")
        .with_artifact_path(dir.path().join("model.bin"));

    let outcome = train_eval_persist(&features, &labels, &config, &RecordingTracker::new()).unwrap();

    // Rebuild the same partition and compare column means
    let split = train_test_split(12, 0.75, 42).unwrap();
    let (x_train, _, _, _) = split.take(&features, &labels);
    let expected_mean = x_train.mean_axis(Axis(0)).unwrap();
    let full_mean = features.mean_axis(Axis(0)).unwrap();

    let scaler_mean = outcome.scaler.mean().unwrap();
    for j in 0..2 {
        assert!(
            (scaler_mean[j] - expected_mean[j]).abs() < 1e-12,
            "column {} mean should come from the training partition",
            j
        );
    }
    assert!(
        (scaler_mean[0] - full_mean[0]).abs() > 1e-9,
        "scaler statistics must exclude the test partition"
    );
}

#[test]
fn test_accuracy_stays_in_unit_interval() {
    let dir = tempdir().unwrap();
    let (features, labels) = synthetic_cars(20);
    let config = PipelineConfig::default()
        .with_train_fraction(0.6)
        .with_artifact_path(dir.path().join("model.bin"));

    let outcome = train_eval_persist(&features, &labels, &config, &RecordingTracker::new()).unwrap();

    assert!((0.0..=1.0).contains(&outcome.accuracy()));
    assert_eq!(outcome.n_train + outcome.n_test, 20);
    assert_eq!(outcome.n_train, 12);
}

#[test]
fn test_saved_artifact_reproduces_predictions() {
    let dir = tempdir().unwrap();
    let (features, labels) = synthetic_cars(16);
    let config = PipelineConfig::default().with_artifact_path(dir.path().join("model.bin"));

    let outcome = train_eval_persist(&features, &labels, &config, &RecordingTracker::new()).unwrap();

    let (loaded, metadata) = ModelArtifact::load(&outcome.artifact_path).unwrap();
    assert_eq!(metadata.feature_names, vec!["Age", "KM"]);
    assert_eq!(metadata.target_name, "Affordable");
    assert_eq!(metadata.metrics.get(METRIC_ACCURACY), Some(&outcome.accuracy()));

    // The loaded bundle scales internally, so raw rows must reproduce
    // training-time predictions exactly.
    let scaled = outcome.scaler.transform(&features).unwrap();
    let expected = outcome.model.predict(&scaled).unwrap();
    let actual = loaded.predict(&features).unwrap();
    assert_eq!(expected, actual);
}

#[test]
fn test_pipeline_with_local_run_store() {
    let dir = tempdir().unwrap();
    let (features, labels) = four_row_data();

    let store = LocalRunStore::new(dir.path().join("runs"), "affordability_training");
    store.log_param("training_set_percentage", "0.75").unwrap();

    let config = PipelineConfig::default().with_artifact_path(dir.path().join("model.bin"));
    let outcome = train_eval_persist(&features, &labels, &config, &store).unwrap();

    let contents = fs::read_to_string(store.run_file()).unwrap();
    let record: RunRecord = serde_json::from_str(&contents).unwrap();

    assert_eq!(record.status, RunStatus::Finished);
    assert!(record.end_time.is_some());
    assert_eq!(
        record.metrics.get(METRIC_TRAINING_SET_PERCENTAGE),
        Some(&0.75)
    );
    assert_eq!(record.metrics.get(METRIC_ACCURACY), Some(&outcome.accuracy()));
    assert_eq!(
        record.params.get("training_set_percentage"),
        Some(&"0.75".to_string())
    );
    assert_eq!(record.artifacts.len(), 1);
    assert!(record.artifacts[0].ends_with("model.bin"));
}

#[test]
fn test_pipeline_from_csv_folder() {
    let dir = tempdir().unwrap();
    let cars_dir = dir.path().join("used_cars");
    fs::create_dir_all(&cars_dir).unwrap();
    fs::write(
        cars_dir.join("UsedCars_Affordability.csv"),
        "Age,KM,Affordable\n\
         2,20000,1\n\
         3,35000,1\n\
         4,40000,1\n\
         5,60000,1\n\
         9,90000,0\n\
         10,110000,0\n\
         11,120000,0\n\
         12,140000,0\n",
    )
    .unwrap();

    let dataset = load_affordability(dir.path()).unwrap();
    assert_eq!(dataset.n_samples(), 8);
    assert_eq!(dataset.n_features(), 2);

    let tracker = RecordingTracker::new();
    let config = PipelineConfig::default().with_artifact_path(dir.path().join("model.bin"));
    let outcome = train_eval_persist(&dataset.features, &dataset.labels, &config, &tracker).unwrap();

    assert_eq!(outcome.n_train, 6);
    assert_eq!(outcome.n_test, 2);
    assert!((0.0..=1.0).contains(&outcome.accuracy()));
    assert!(tracker.is_completed());
}

#[test]
fn test_non_convergence_aborts_before_metrics() {
    let dir = tempdir().unwrap();
    let artifact_path = dir.path().join("model.bin");
    let (features, labels) = four_row_data();
    let tracker = RecordingTracker::new();
    let config = PipelineConfig::default()
        .with_max_iter(1)
        .with_tol(1e-12)
        .with_artifact_path(&artifact_path);

    let result = train_eval_persist(&features, &labels, &config, &tracker);

    assert!(matches!(result, Err(AffordError::ConvergenceError { iterations: 1 })));
    assert!(tracker.metrics().is_empty());
    assert!(tracker.artifacts().is_empty());
    assert!(!tracker.is_completed());
    assert!(!artifact_path.exists(), "no artifact may be written on failure");
}
