//! Model training: partitioning, the classifier and its evaluation

pub mod logistic;
pub mod metrics;
pub mod split;

pub use logistic::LogisticRegression;
pub use metrics::ClassificationMetrics;
pub use split::{train_test_split, TrainTestSplit};
