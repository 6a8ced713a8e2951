//! Affordability CLI
//!
//! Command-line interface for training the affordability model and
//! predicting with a saved artifact.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

use crate::artifact::ModelArtifact;
use crate::data::{columns_to_array2, load_affordability, load_csv};
use crate::pipeline::{train_eval_persist, PipelineConfig};
use crate::tracking::{LocalRunStore, RunTracker};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "affordability")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Used-car affordability model pipeline")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the affordability model and persist the artifact
    Train {
        /// Folder containing used_cars/UsedCars_Affordability.csv
        #[arg(short, long)]
        data_folder: PathBuf,

        /// Fraction of rows used for training, strictly between 0 and 1
        #[arg(short, long, default_value_t = 0.75)]
        training_set_percentage: f64,

        /// Output model file
        #[arg(short, long, default_value = "outputs/model.bin")]
        output: PathBuf,

        /// Directory where run records are written
        #[arg(long, default_value = "runs")]
        runs_dir: PathBuf,

        /// Seed for the train/test shuffle
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Make predictions using a trained model
    Predict {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV containing the model's feature columns
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions file (prints a preview when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_folder: &Path,
    training_set_percentage: f64,
    output: &Path,
    runs_dir: &Path,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = load_affordability(data_folder)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        dataset.n_samples(),
        dataset.n_features(),
        start.elapsed()
    ));

    let store = LocalRunStore::new(runs_dir, "affordability_training");
    store.log_param("data_folder", data_folder.display().to_string())?;
    store.log_param("training_set_percentage", training_set_percentage.to_string())?;
    store.log_param("seed", seed.to_string())?;
    store.log_param("output", output.display().to_string())?;

    let config = PipelineConfig::default()
        .with_train_fraction(training_set_percentage)
        .with_seed(seed)
        .with_artifact_path(output);

    step_run("Training");
    let start = Instant::now();
    let outcome = match train_eval_persist(&dataset.features, &dataset.labels, &config, &store) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("{}", "failed".red());
            if let Err(track_err) = store.fail() {
                warn!(error = %track_err, "could not record failed run");
            }
            return Err(e.into());
        }
    };
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", outcome.accuracy()).white().bold());
    println!("  {:<16} {}", muted("Train rows"), outcome.n_train.to_string().white());
    println!("  {:<16} {}", muted("Test rows"), outcome.n_test.to_string().white());
    println!("  {:<16} {}", muted("Artifact"), outcome.artifact_path.display().to_string().white());
    println!("  {:<16} {}", muted("Run"), store.run_id().white());
    println!();
    println!(
        "  With {:.2} percent of data, model accuracy reached {:.4}.",
        training_set_percentage,
        outcome.accuracy()
    );
    println!();

    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let (artifact, metadata) = ModelArtifact::load(model_path)?;
    step_done(&format!("{} v{}", metadata.name, metadata.version));

    step_run("Loading data");
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    let feature_refs: Vec<&str> = metadata.feature_names.iter().map(|s| s.as_str()).collect();
    let features = columns_to_array2(&df, &feature_refs)?;
    let labels = artifact.predict(&features)?;
    let proba = artifact.predict_proba(&features)?;

    match output {
        Some(output_path) => {
            let mut out = df.clone();
            out.with_column(Series::new(
                format!("{}_Prediction", metadata.target_name).into(),
                labels.to_vec(),
            ))?;
            out.with_column(Series::new(
                format!("{}_Probability", metadata.target_name).into(),
                proba.to_vec(),
            ))?;

            step_run(&format!("Saving → {}", output_path.display()));
            let mut file = std::fs::File::create(output_path)?;
            CsvWriter::new(&mut file).finish(&mut out)?;
            step_done(&format!("{} rows", out.height()));
        }
        None => {
            const PREVIEW_ROWS: usize = 20;

            println!();
            println!("  {:<8} {:>12} {:>8}", muted("Row"), muted("Probability"), muted("Label"));
            println!("  {}", dim(&"─".repeat(32)));
            for (i, (p, l)) in proba.iter().zip(labels.iter()).take(PREVIEW_ROWS).enumerate() {
                println!("  {:<8} {:>12.4} {:>8}", i, p, l);
            }
            if labels.len() > PREVIEW_ROWS {
                println!("  {}", dim(&format!("… and {} more rows", labels.len() - PREVIEW_ROWS)));
            }
        }
    }

    let n_affordable = labels.iter().filter(|&&l| l == 1.0).count();
    println!();
    step_ok(&format!("{} of {} rows predicted affordable", n_affordable, labels.len()));
    println!();

    Ok(())
}
