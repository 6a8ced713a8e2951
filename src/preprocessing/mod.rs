//! Data preprocessing module
//!
//! Feature standardization fitted on the training partition only.

pub mod scaler;

pub use scaler::StandardScaler;
