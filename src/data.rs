//! Dataset loading and column extraction
//!
//! Reads the used-car affordability CSV and turns named columns into the
//! ndarray matrices the training code consumes.

use crate::error::{AffordError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Feature columns of the affordability dataset
pub const FEATURE_COLUMNS: [&str; 2] = ["Age", "KM"];

/// Target column of the affordability dataset
pub const TARGET_COLUMN: &str = "Affordable";

/// In-memory dataset: row-major feature matrix plus aligned labels
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature rows, one per sample
    pub features: Array2<f64>,
    /// Binary labels aligned with the feature rows
    pub labels: Array1<f64>,
    /// Names of the feature columns, in matrix order
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Extract named feature columns and a target column from a DataFrame
    pub fn from_dataframe(df: &DataFrame, feature_cols: &[&str], target_col: &str) -> Result<Self> {
        let features = columns_to_array2(df, feature_cols)?;
        let labels = column_to_array1(df, target_col)?;

        if features.nrows() != labels.len() {
            return Err(AffordError::ShapeError {
                expected: format!("{} label rows", features.nrows()),
                actual: format!("{} label rows", labels.len()),
            });
        }

        Ok(Self {
            features,
            labels,
            feature_names: feature_cols.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Load a CSV file with a header row into a DataFrame
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| AffordError::DataError(format!("{}: {}", path.display(), e)))?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| AffordError::DataError(e.to_string()))
}

/// Path of the affordability CSV under a data folder
pub fn affordability_csv_path(data_folder: &Path) -> PathBuf {
    data_folder
        .join("used_cars")
        .join("UsedCars_Affordability.csv")
}

/// Load `<data_folder>/used_cars/UsedCars_Affordability.csv` into a [`Dataset`]
/// with the `Age` and `KM` features and the `Affordable` target.
pub fn load_affordability(data_folder: &Path) -> Result<Dataset> {
    let path = affordability_csv_path(data_folder);
    let df = load_csv(&path)?;
    Dataset::from_dataframe(&df, &FEATURE_COLUMNS, TARGET_COLUMN)
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
/// Columns are cast to Float64 before extraction.
pub fn columns_to_array2(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    // Collect all columns as contiguous f64 Vecs
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| AffordError::FeatureNotFound(col_name.to_string()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| AffordError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| AffordError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

fn column_to_array1(df: &DataFrame, col_name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(col_name)
        .map_err(|_| AffordError::FeatureNotFound(col_name.to_string()))?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| AffordError::DataError(e.to_string()))?;

    let values: Array1<f64> = series_f64
        .f64()
        .map_err(|e| AffordError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    Ok(values)
}
