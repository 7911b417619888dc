//! Carrot - Main Entry Point

use clap::Parser;
use carrot::cli::{cmd_algorithms, cmd_compare, cmd_tune, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carrot=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Algorithms => cmd_algorithms()?,
        Commands::Compare { data, target, scaler, include, sort, cv_folds } => {
            cmd_compare(&data, &target, &scaler, include, sort.as_deref(), cv_folds)?;
        }
        Commands::Tune { data, target, include, optimize, n_trials, features, scaler, cv_folds, output } => {
            cmd_tune(&data, &target, include, &optimize, n_trials, features, &scaler, cv_folds, output.as_deref())?;
        }
    }

    Ok(())
}
