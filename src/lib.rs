//! Carrot - binary classification model comparison and tuning
//!
//! This crate provides:
//! - Data loading and feature scaling into a training [`Setup`](data::Setup)
//! - A catalogue of twelve binary classifiers and five metrics
//! - Stratified cross-validation
//! - Algorithm comparison and per-algorithm hyperparameter studies
//!
//! # Modules
//!
//! - [`data`] - Loading, scaling, training setup
//! - [`training`] - Classifiers, metrics, cross-validation
//! - [`optimizer`] - Search spaces, samplers, studies
//! - [`modelling`] - Algorithm comparison and hyperparameter tuning
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod training;
pub mod optimizer;
pub mod modelling;

pub mod cli;

pub use error::{CarrotError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{CarrotError, Result};

    pub use crate::data::{load_data, ScalerType, Setup};

    pub use crate::training::{CVConfig, CVStrategy, Metric, Model, ModelInstance};

    pub use crate::optimizer::{SamplerType, SearchSpace, Study, StudyConfig};

    pub use crate::modelling::{
        compare_algorithms, tune_hyperparams, Algorithm, CompareConfig, ComparisonTable, Hyperparams,
        ModelRegistry, TuneConfig, TuningTable,
    };
}
