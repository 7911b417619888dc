//! Carrot CLI Module
//!
//! Command-line interface for comparing and tuning classifiers.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::{load_data, ScalerType, Setup};
use crate::modelling::{
    compare_algorithms, tune_hyperparams, Algorithm, CompareConfig, ComparisonTable, TuneConfig, TuningTable,
};
use crate::training::{CVConfig, Metric};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

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
#[command(name = "carrot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare and tune binary classifiers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the algorithm catalogue
    Algorithms,

    /// Cross-validate algorithms with default hyperparameters
    Compare {
        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// Feature scaler (standard, minmax, none)
        #[arg(long, default_value = "standard")]
        scaler: String,

        /// Algorithms to compare, comma separated; all when omitted
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Metric to sort by
        #[arg(short, long)]
        sort: Option<String>,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5")]
        cv_folds: usize,
    },

    /// Search hyperparameters for each algorithm
    Tune {
        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// Algorithms to tune, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        include: Vec<String>,

        /// Metric to maximize
        #[arg(long)]
        optimize: String,

        /// Trials per algorithm
        #[arg(short, long, default_value = "20")]
        n_trials: usize,

        /// Restrict tuning to these feature columns
        #[arg(short, long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Feature scaler (standard, minmax, none)
        #[arg(long, default_value = "standard")]
        scaler: String,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5")]
        cv_folds: usize,

        /// Write the tuning table as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn prepare(data_path: &Path, target: &str, scaler: &str) -> anyhow::Result<Setup> {
    let scaler: ScalerType = scaler.parse()?;

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run(&format!("Preparing setup ({} scaling)", scaler));
    let setup = Setup::from_dataframe(&df, target, scaler)?;
    step_done(&format!("{} features", setup.feature_names().len()));

    Ok(setup)
}

pub fn cmd_algorithms() -> anyhow::Result<()> {
    section("Algorithms");

    println!("  {:<20} {:<28} {}", muted("id"), muted("name"), muted("scaling"));
    for algorithm in Algorithm::all() {
        let scaling = if algorithm.requires_scaling() { "required" } else { "optional" };
        println!("  {:<20} {:<28} {}", algorithm.id().cyan(), algorithm.name(), dim(scaling));
    }

    println!();
    Ok(())
}

pub fn cmd_compare(
    data_path: &Path,
    target: &str,
    scaler: &str,
    include: Option<Vec<String>>,
    sort: Option<&str>,
    cv_folds: usize,
) -> anyhow::Result<()> {
    section("Compare");

    let setup = prepare(data_path, target, scaler)?;

    let mut config = CompareConfig::new()
        .with_sort(sort)
        .with_cv(CVConfig::default().with_n_splits(cv_folds));
    config.include = include;

    step_run("Cross-validating");
    let start = Instant::now();
    let (table, _) = compare_algorithms(&setup, &config)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_comparison(&table);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_tune(
    data_path: &Path,
    target: &str,
    include: Vec<String>,
    optimize: &str,
    n_trials: usize,
    features: Option<Vec<String>>,
    scaler: &str,
    cv_folds: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Tune");

    let setup = prepare(data_path, target, scaler)?;

    let mut config = TuneConfig::new(include, optimize)
        .with_n_trials(n_trials)
        .with_cv(CVConfig::default().with_n_splits(cv_folds));
    config.feature_list = features;

    step_run(&format!("Running {} trials per algorithm", n_trials));
    let start = Instant::now();
    let (table, _) = tune_hyperparams(&setup, &config)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_tuning(&table, optimize);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&table)?)?;
        println!("  {} {}", ok("saved"), path.display());
        println!();
    }

    Ok(())
}

fn print_comparison(table: &ComparisonTable) {
    println!();
    print!("  {:<20}", muted("algorithm"));
    for metric in Metric::all() {
        print!(" {:>9}", muted(metric.as_str()));
    }
    println!(" {:>9}", muted("fit (s)"));
    println!("  {}", dim(&"─".repeat(80)));

    for row in table.rows() {
        print!("  {:<20}", row.algorithm.id());
        for metric in Metric::all() {
            print!(" {:>9.4}", row.get(metric));
        }
        println!(" {:>9.3}", row.fit_time_secs);
    }

    println!("  {}", dim(&"─".repeat(80)));
    println!();
}

fn print_tuning(table: &TuningTable, metric: &str) {
    println!();
    println!("  {:<20} {:>10}  {}", muted("algorithm"), muted(metric), muted("hyperparams"));
    println!("  {}", dim(&"─".repeat(56)));

    for row in table.rows() {
        let params = row
            .hyperparams
            .to_json()
            .map(|v| v.to_string())
            .unwrap_or_else(|e| format!("<{}>", e));
        println!("  {:<20} {:>10.4}  {}", row.algorithm.id(), row.metric, dim(&params));
    }

    if let Some(best) = table.rows().first() {
        println!();
        println!("  {} {} {} {:.4}", ok("best"), best.algorithm.id().white().bold(), muted(&format!("{}:", metric)), best.metric);
    }

    println!();
}
