//! Run tracking
//!
//! Metrics, parameters and artifact paths produced while training are
//! collected into a [`RunRecord`] through the [`RunTracker`] interface.
//! [`LocalRunStore`] persists closed records as JSON files.

pub mod local;
pub mod run;

pub use local::LocalRunStore;
pub use run::{NoopTracker, RunRecord, RunStatus, RunTracker};
