//! Affordability - Main Entry Point
//!
//! Trains the used-car affordability model and scores CSVs with saved
//! artifacts.

use clap::Parser;

use affordability::cli::{cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "affordability=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_folder,
            training_set_percentage,
            output,
            runs_dir,
            seed,
        } => {
            cmd_train(&data_folder, training_set_percentage, &output, &runs_dir, seed)?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
    }

    Ok(())
}
