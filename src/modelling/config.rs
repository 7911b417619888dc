//! Run configurations for the comparator and the tuner

use crate::optimizer::SamplerType;
use crate::training::CVConfig;
use serde::{Deserialize, Serialize};

/// Configuration for [`compare_algorithms`](super::compare_algorithms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Algorithm identifiers to evaluate; `None` selects the whole catalogue
    pub include: Option<Vec<String>>,
    /// Metric to sort the table by; `None` keeps evaluation order
    pub sort: Option<String>,
    /// Refit each algorithm on the full training split and return it
    pub return_models: bool,
    pub cv: CVConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            include: None,
            sort: None,
            return_models: false,
            cv: CVConfig::default(),
        }
    }
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include<S: Into<String>>(mut self, include: impl IntoIterator<Item = S>) -> Self {
        self.include = Some(include.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sort(mut self, sort: Option<&str>) -> Self {
        self.sort = sort.map(str::to_string);
        self
    }

    pub fn with_return_models(mut self, return_models: bool) -> Self {
        self.return_models = return_models;
        self
    }

    pub fn with_cv(mut self, cv: CVConfig) -> Self {
        self.cv = cv;
        self
    }
}

/// Configuration for [`tune_hyperparams`](super::tune_hyperparams)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneConfig {
    /// Algorithm identifiers to tune, in order
    pub include: Vec<String>,
    /// Metric to maximize
    pub optimize: String,
    /// Trials per algorithm
    pub n_trials: usize,
    /// Restrict the feature matrix to these columns
    pub feature_list: Option<Vec<String>>,
    /// Refit each algorithm with its best parameters and return it
    pub return_models: bool,
    pub cv: CVConfig,
    pub sampler: SamplerType,
    /// Seed of every study's sampler
    pub random_state: Option<u64>,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            optimize: "accuracy".to_string(),
            n_trials: 20,
            feature_list: None,
            return_models: false,
            cv: CVConfig::default(),
            sampler: SamplerType::TPE,
            random_state: Some(42),
        }
    }
}

impl TuneConfig {
    pub fn new<S: Into<String>>(include: impl IntoIterator<Item = S>, optimize: &str) -> Self {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            optimize: optimize.to_string(),
            ..Default::default()
        }
    }

    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    pub fn with_feature_list<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.feature_list = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_return_models(mut self, return_models: bool) -> Self {
        self.return_models = return_models;
        self
    }

    pub fn with_cv(mut self, cv: CVConfig) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }
}
