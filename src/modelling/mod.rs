//! Model comparison and hyperparameter tuning
//!
//! Provides:
//! - The algorithm catalogue and argument validation
//! - Per-algorithm hyperparameter sets and their search spaces
//! - [`compare_algorithms`], cross-validating default-configured algorithms
//! - [`tune_hyperparams`], one study per algorithm maximizing a metric

mod catalogue;
mod compare;
mod config;
mod factory;
mod hyperparams;
mod results;
mod train;
mod tune;

pub use crate::training::Metric;
pub use catalogue::{check_feature_scaling, check_include, check_metric, Algorithm};
pub use compare::compare_algorithms;
pub use config::{CompareConfig, TuneConfig};
pub use factory::{build_model, get_model_instance};
pub use hyperparams::{
    DecisionTreeParams, ExtraTreeParams, ExtraTreesParams, Hyperparams, KNNParams, LinearSVCParams,
    LogisticRegressionParams, NaiveBayesParams, PassiveAggressiveParams, PerceptronParams, RandomForestParams,
    RbfSVCParams, RidgeParams,
};
pub use results::{ComparisonRow, ComparisonTable, ModelRegistry, TuningRow, TuningTable, FIT_TIME_COLUMN};
pub use train::train_model;
pub use tune::{tune_hyperparams, TuningObjective, HYPERPARAMS_ATTR};
