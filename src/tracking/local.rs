//! File-backed run store
//!
//! Persists each run as one JSON document under a runs directory. The file
//! is written when the run closes, so an aborted process leaves no record
//! behind.

use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};

use tracing::debug;

use crate::error::{AffordError, Result};

use super::run::{RunRecord, RunStatus, RunTracker};

/// Tracker backed by one JSON file per run
pub struct LocalRunStore {
    runs_dir: PathBuf,
    record: RwLock<RunRecord>,
}

impl LocalRunStore {
    /// Start tracking a new run stored below `runs_dir`
    pub fn new(runs_dir: impl Into<PathBuf>, run_name: impl Into<String>) -> Self {
        Self {
            runs_dir: runs_dir.into(),
            record: RwLock::new(RunRecord::new(run_name)),
        }
    }

    /// ID of the tracked run
    pub fn run_id(&self) -> String {
        self.record
            .read()
            .map(|r| r.run_id.clone())
            .unwrap_or_default()
    }

    /// Path the run record is written to on close
    pub fn run_file(&self) -> PathBuf {
        self.runs_dir.join(format!("{}.json", self.run_id()))
    }

    /// Snapshot of the current record
    pub fn record(&self) -> Result<RunRecord> {
        self.record
            .read()
            .map(|r| r.clone())
            .map_err(|_| AffordError::TrackingError("run record lock poisoned".to_string()))
    }

    /// Record a run parameter
    pub fn log_param(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut record = self.write_record()?;
        record.params.insert(key.into(), value.into());
        Ok(())
    }

    fn write_record(&self) -> Result<RwLockWriteGuard<'_, RunRecord>> {
        self.record
            .write()
            .map_err(|_| AffordError::TrackingError("run record lock poisoned".to_string()))
    }

    fn close(&self, status: RunStatus) -> Result<()> {
        let snapshot = {
            let mut record = self.write_record()?;
            record.close(status);
            record.clone()
        };

        fs::create_dir_all(&self.runs_dir)?;
        let path = self.runs_dir.join(format!("{}.json", snapshot.run_id));
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)?;

        debug!(path = %path.display(), "run record written");
        Ok(())
    }
}

impl RunTracker for LocalRunStore {
    fn log_metric(&self, name: &str, value: f64) -> Result<()> {
        let mut record = self.write_record()?;
        record.metrics.insert(name.to_string(), value);
        Ok(())
    }

    fn log_artifact(&self, path: &str) -> Result<()> {
        let mut record = self.write_record()?;
        record.artifacts.push(path.to_string());
        Ok(())
    }

    fn complete(&self) -> Result<()> {
        self.close(RunStatus::Finished)
    }

    fn fail(&self) -> Result<()> {
        self.close(RunStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_complete_writes_json() {
        let dir = tempdir().unwrap();
        let store = LocalRunStore::new(dir.path().join("runs"), "affordability_training");

        store.log_param("seed", "42").unwrap();
        store.log_metric("Accuracy", 0.75).unwrap();
        store.log_artifact("outputs/model.bin").unwrap();
        store.complete().unwrap();

        let contents = fs::read_to_string(store.run_file()).unwrap();
        let record: RunRecord = serde_json::from_str(&contents).unwrap();

        assert_eq!(record.status, RunStatus::Finished);
        assert!(record.end_time.is_some());
        assert_eq!(record.params.get("seed"), Some(&"42".to_string()));
        assert_eq!(record.metrics.get("Accuracy"), Some(&0.75));
        assert_eq!(record.artifacts, vec!["outputs/model.bin".to_string()]);
    }

    #[test]
    fn test_fail_marks_record_failed() {
        let dir = tempdir().unwrap();
        let store = LocalRunStore::new(dir.path().join("runs"), "affordability_training");

        store.fail().unwrap();

        let contents = fs::read_to_string(store.run_file()).unwrap();
        let record: RunRecord = serde_json::from_str(&contents).unwrap();
        assert_eq!(record.status, RunStatus::Failed);
    }

    #[test]
    fn test_nothing_on_disk_before_close() {
        let dir = tempdir().unwrap();
        let store = LocalRunStore::new(dir.path().join("runs"), "affordability_training");

        store.log_metric("Accuracy", 1.0).unwrap();
        assert!(!store.run_file().exists());
    }

    #[test]
    fn test_record_snapshot() {
        let dir = tempdir().unwrap();
        let store = LocalRunStore::new(dir.path().join("runs"), "affordability_training");

        store.log_metric("Training_Set_Percentage", 0.75).unwrap();

        let record = store.record().unwrap();
        assert_eq!(record.status, RunStatus::Running);
        assert_eq!(record.metrics.get("Training_Set_Percentage"), Some(&0.75));
        assert_eq!(store.run_id(), record.run_id);
    }
}
