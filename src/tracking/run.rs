//! Run records and the tracking interface

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status of a tracked run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is currently running
    Running,
    /// Run completed successfully
    Finished,
    /// Run failed
    Failed,
}

/// A single tracked training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run ID
    pub run_id: String,
    /// Run name
    pub run_name: String,
    /// Start time (unix seconds)
    pub start_time: u64,
    /// End time (None while running)
    pub end_time: Option<u64>,
    /// Status
    pub status: RunStatus,
    /// Parameters
    pub params: HashMap<String, String>,
    /// Latest metrics
    pub metrics: HashMap<String, f64>,
    /// Artifact paths
    pub artifacts: Vec<String>,
}

impl RunRecord {
    /// Create a new record in the `Running` state
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_id: generate_run_id(),
            run_name: run_name.into(),
            start_time: current_timestamp(),
            end_time: None,
            status: RunStatus::Running,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
        }
    }

    /// Set the final status and stamp the end time
    pub fn close(&mut self, status: RunStatus) {
        self.end_time = Some(current_timestamp());
        self.status = status;
    }

    /// Run duration in seconds
    pub fn duration_secs(&self) -> u64 {
        let end = self.end_time.unwrap_or_else(current_timestamp);
        end.saturating_sub(self.start_time)
    }
}

/// Sink for metrics and artifacts produced by a training run.
///
/// The pipeline borrows a trait object, so the caller decides where run
/// data goes: local files, a test recorder, or nowhere at all.
pub trait RunTracker {
    /// Record a named metric value
    fn log_metric(&self, name: &str, value: f64) -> Result<()>;

    /// Record the path of a produced artifact
    fn log_artifact(&self, path: &str) -> Result<()>;

    /// Mark the run as successfully completed
    fn complete(&self) -> Result<()>;

    /// Mark the run as failed
    fn fail(&self) -> Result<()>;
}

/// Tracker that drops everything, for callers that do not record runs
#[derive(Debug, Default)]
pub struct NoopTracker;

impl RunTracker for NoopTracker {
    fn log_metric(&self, _name: &str, _value: f64) -> Result<()> {
        Ok(())
    }

    fn log_artifact(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn complete(&self) -> Result<()> {
        Ok(())
    }

    fn fail(&self) -> Result<()> {
        Ok(())
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn generate_run_id() -> String {
    format!("run_{}", current_timestamp())
}
