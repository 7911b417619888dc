//! Studies, trials and the objective seam

use super::{
    config::{OptimizeDirection, StudyConfig},
    samplers::{create_sampler, Sampler},
    search_space::{ParameterValue, SearchSpace, TrialParams},
};
use crate::error::{CarrotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// A trial in progress: sampled parameters plus user attributes the
/// objective attaches while evaluating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    number: usize,
    params: TrialParams,
    user_attrs: BTreeMap<String, serde_json::Value>,
}

impl Trial {
    /// Create a trial from already sampled parameters
    pub fn new(number: usize, params: TrialParams) -> Self {
        Self {
            number,
            params,
            user_attrs: BTreeMap::new(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn params(&self) -> &TrialParams {
        &self.params
    }

    /// Raw parameter value by name
    pub fn param(&self, name: &str) -> Result<&ParameterValue> {
        self.params.get(name).ok_or_else(|| CarrotError::InvalidParameter {
            name: name.to_string(),
            value: "<missing>".to_string(),
            reason: format!("trial {} has no such parameter", self.number),
        })
    }

    /// Float parameter; integers are widened
    pub fn get_float(&self, name: &str) -> Result<f64> {
        let value = self.param(name)?;
        value.as_float().ok_or_else(|| mistyped(name, value, "float"))
    }

    pub fn get_int(&self, name: &str) -> Result<i64> {
        let value = self.param(name)?;
        value.as_int().ok_or_else(|| mistyped(name, value, "integer"))
    }

    pub fn get_categorical(&self, name: &str) -> Result<&str> {
        let value = self.param(name)?;
        value.as_string().ok_or_else(|| mistyped(name, value, "categorical"))
    }

    /// Attach arbitrary metadata to the trial
    pub fn set_user_attr(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.user_attrs.insert(key.into(), value);
    }

    pub fn user_attrs(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.user_attrs
    }
}

fn mistyped(name: &str, value: &ParameterValue, expected: &str) -> CarrotError {
    CarrotError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: format!("expected a {} value", expected),
    }
}

/// A finished trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenTrial {
    /// Trial number, starting at zero
    pub number: usize,
    /// Parameters used
    pub params: TrialParams,
    /// Objective value
    pub value: f64,
    /// Metadata attached by the objective
    pub user_attrs: BTreeMap<String, serde_json::Value>,
    /// Trial duration in seconds
    pub duration_secs: f64,
}

impl FrozenTrial {
    pub fn user_attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.user_attrs.get(key)
    }
}

/// Something a study can evaluate trials against
pub trait Objective {
    fn evaluate(&self, trial: &mut Trial) -> Result<f64>;
}

impl<F> Objective for F
where
    F: Fn(&mut Trial) -> Result<f64>,
{
    fn evaluate(&self, trial: &mut Trial) -> Result<f64> {
        self(trial)
    }
}

/// A bounded sequence of trials over one search space
pub struct Study {
    name: String,
    config: StudyConfig,
    search_space: SearchSpace,
    sampler: Box<dyn Sampler>,
    trials: Vec<FrozenTrial>,
    best_trial_idx: Option<usize>,
}

impl std::fmt::Debug for Study {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Study")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("n_trials", &self.trials.len())
            .field("best_trial_idx", &self.best_trial_idx)
            .finish()
    }
}

impl Study {
    /// Create a new study
    pub fn new(name: impl Into<String>, config: StudyConfig, search_space: SearchSpace) -> Self {
        let sampler = create_sampler(config.sampler, config.random_state, config.n_startup_trials);
        Self {
            name: name.into(),
            config,
            search_space,
            sampler,
            trials: Vec::new(),
            best_trial_idx: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> OptimizeDirection {
        self.config.direction
    }

    pub fn search_space(&self) -> &SearchSpace {
        &self.search_space
    }

    /// All finished trials in the order they ran
    pub fn trials(&self) -> &[FrozenTrial] {
        &self.trials
    }

    /// Get the best trial
    pub fn best_trial(&self) -> Option<&FrozenTrial> {
        self.best_trial_idx.map(|idx| &self.trials[idx])
    }

    /// Get the best value
    pub fn best_value(&self) -> Option<f64> {
        self.best_trial().map(|t| t.value)
    }

    /// Get the best parameters
    pub fn best_params(&self) -> Option<&TrialParams> {
        self.best_trial().map(|t| &t.params)
    }

    /// Run exactly `n_trials` trials.
    ///
    /// The first objective error aborts the run and is returned unchanged;
    /// trials finished before it stay recorded.
    pub fn optimize<O>(&mut self, objective: &O, n_trials: usize) -> Result<()>
    where
        O: Objective + ?Sized,
    {
        if n_trials == 0 {
            return Err(CarrotError::InvalidParameter {
                name: "n_trials".to_string(),
                value: "0".to_string(),
                reason: "at least one trial is required".to_string(),
            });
        }

        for _ in 0..n_trials {
            let number = self.trials.len();
            let history: Vec<(TrialParams, f64)> = self
                .trials
                .iter()
                .map(|t| (t.params.clone(), self.config.direction.to_loss(t.value)))
                .collect();

            let params = self.sampler.sample(&self.search_space, &history);
            let mut trial = Trial::new(number, params);

            let trial_start = Instant::now();
            let value = objective.evaluate(&mut trial)?;
            let duration_secs = trial_start.elapsed().as_secs_f64();

            if !value.is_finite() {
                return Err(CarrotError::OptimizationError(format!(
                    "{}: trial {} returned a non-finite value ({})",
                    self.name, number, value
                )));
            }

            debug!(study = %self.name, trial = number, value, duration_secs, "Trial finished");

            self.add_trial(FrozenTrial {
                number,
                params: trial.params,
                value,
                user_attrs: trial.user_attrs,
                duration_secs,
            });
        }

        Ok(())
    }

    fn add_trial(&mut self, trial: FrozenTrial) {
        let idx = self.trials.len();
        let is_better = match self.best_trial_idx {
            None => true,
            Some(best_idx) => self.config.direction.is_better(trial.value, self.trials[best_idx].value),
        };

        if is_better {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(trial);
    }
}
