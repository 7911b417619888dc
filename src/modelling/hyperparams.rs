//! Explicit hyperparameter sets, one struct per algorithm
//!
//! Every struct lists the names its model recognizes, carries the model's
//! defaults, knows its search space and can be read back from a trial.
//! Values coming from a trial are checked against the search space; values
//! coming from anywhere else are checked by [`Hyperparams::validate`].

use super::catalogue::Algorithm;
use crate::error::{CarrotError, Result};
use crate::optimizer::{ParameterValue, SearchSpace, Trial};
use crate::training::{Criterion, DistanceMetric, MaxFeatures, WeightScheme};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogisticRegressionParams {
    pub alpha: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            learning_rate: 0.1,
            max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionTreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtraTreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ExtraTreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtraTreesParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
}

impl Default for ExtraTreesParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RidgeParams {
    pub alpha: f64,
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerceptronParams {
    pub alpha: f64,
    pub eta0: f64,
    pub max_iter: usize,
}

impl Default for PerceptronParams {
    fn default() -> Self {
        Self {
            alpha: 1e-4,
            eta0: 1.0,
            max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PassiveAggressiveParams {
    pub c: f64,
    pub max_iter: usize,
}

impl Default for PassiveAggressiveParams {
    fn default() -> Self {
        Self { c: 1.0, max_iter: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KNNParams {
    pub n_neighbors: usize,
    pub weights: WeightScheme,
    pub metric: DistanceMetric,
}

impl Default for KNNParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            weights: WeightScheme::Uniform,
            metric: DistanceMetric::Euclidean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NaiveBayesParams {
    pub var_smoothing: f64,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self { var_smoothing: 1e-9 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinearSVCParams {
    pub c: f64,
}

impl Default for LinearSVCParams {
    fn default() -> Self {
        Self { c: 1.0 }
    }
}

/// `gamma: None` derives gamma from the training data at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RbfSVCParams {
    pub c: f64,
    pub gamma: Option<f64>,
}

impl Default for RbfSVCParams {
    fn default() -> Self {
        Self { c: 1.0, gamma: None }
    }
}

/// Hyperparameters for any catalogue algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum Hyperparams {
    #[serde(rename = "lr")]
    LogisticRegression(LogisticRegressionParams),
    #[serde(rename = "dt")]
    DecisionTree(DecisionTreeParams),
    #[serde(rename = "extratree")]
    ExtraTree(ExtraTreeParams),
    #[serde(rename = "extratrees")]
    ExtraTrees(ExtraTreesParams),
    #[serde(rename = "rf")]
    RandomForest(RandomForestParams),
    #[serde(rename = "ridge")]
    Ridge(RidgeParams),
    #[serde(rename = "perceptron")]
    Perceptron(PerceptronParams),
    #[serde(rename = "passive-aggressive")]
    PassiveAggressive(PassiveAggressiveParams),
    #[serde(rename = "knn")]
    KNN(KNNParams),
    #[serde(rename = "nb")]
    NaiveBayes(NaiveBayesParams),
    #[serde(rename = "linearsvc")]
    LinearSVC(LinearSVCParams),
    #[serde(rename = "rbfsvc")]
    RbfSVC(RbfSVCParams),
}

impl Hyperparams {
    /// Model defaults for an algorithm
    pub fn default_for(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::LogisticRegression => Hyperparams::LogisticRegression(Default::default()),
            Algorithm::DecisionTree => Hyperparams::DecisionTree(Default::default()),
            Algorithm::ExtraTree => Hyperparams::ExtraTree(Default::default()),
            Algorithm::ExtraTrees => Hyperparams::ExtraTrees(Default::default()),
            Algorithm::RandomForest => Hyperparams::RandomForest(Default::default()),
            Algorithm::Ridge => Hyperparams::Ridge(Default::default()),
            Algorithm::Perceptron => Hyperparams::Perceptron(Default::default()),
            Algorithm::PassiveAggressive => Hyperparams::PassiveAggressive(Default::default()),
            Algorithm::KNN => Hyperparams::KNN(Default::default()),
            Algorithm::NaiveBayes => Hyperparams::NaiveBayes(Default::default()),
            Algorithm::LinearSVC => Hyperparams::LinearSVC(Default::default()),
            Algorithm::RbfSVC => Hyperparams::RbfSVC(Default::default()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Hyperparams::LogisticRegression(_) => Algorithm::LogisticRegression,
            Hyperparams::DecisionTree(_) => Algorithm::DecisionTree,
            Hyperparams::ExtraTree(_) => Algorithm::ExtraTree,
            Hyperparams::ExtraTrees(_) => Algorithm::ExtraTrees,
            Hyperparams::RandomForest(_) => Algorithm::RandomForest,
            Hyperparams::Ridge(_) => Algorithm::Ridge,
            Hyperparams::Perceptron(_) => Algorithm::Perceptron,
            Hyperparams::PassiveAggressive(_) => Algorithm::PassiveAggressive,
            Hyperparams::KNN(_) => Algorithm::KNN,
            Hyperparams::NaiveBayes(_) => Algorithm::NaiveBayes,
            Hyperparams::LinearSVC(_) => Algorithm::LinearSVC,
            Hyperparams::RbfSVC(_) => Algorithm::RbfSVC,
        }
    }

    /// Ranges the tuner searches for an algorithm
    pub fn search_space(algorithm: Algorithm) -> SearchSpace {
        let space = SearchSpace::new();
        match algorithm {
            Algorithm::LogisticRegression => space
                .log_float("alpha", 1e-5, 1.0)
                .log_float("learning_rate", 1e-3, 1.0)
                .int("max_iter", 100, 2000),
            Algorithm::DecisionTree => space
                .int("max_depth", 1, 20)
                .int("min_samples_split", 2, 20)
                .int("min_samples_leaf", 1, 10)
                .categorical("criterion", &["gini", "entropy"]),
            Algorithm::ExtraTree => space
                .int("max_depth", 1, 20)
                .int("min_samples_split", 2, 20)
                .int("min_samples_leaf", 1, 10),
            Algorithm::ExtraTrees => space
                .int("n_estimators", 10, 200)
                .int("max_depth", 2, 20)
                .int("min_samples_leaf", 1, 10),
            Algorithm::RandomForest => space
                .int("n_estimators", 10, 200)
                .int("max_depth", 2, 20)
                .int("min_samples_leaf", 1, 10)
                .categorical("max_features", &["sqrt", "log2", "all"]),
            Algorithm::Ridge => space.log_float("alpha", 1e-3, 100.0),
            Algorithm::Perceptron => space
                .log_float("alpha", 1e-6, 1e-1)
                .log_float("eta0", 1e-3, 1.0)
                .int("max_iter", 5, 200),
            Algorithm::PassiveAggressive => space.log_float("c", 1e-3, 10.0).int("max_iter", 5, 200),
            Algorithm::KNN => space
                .int("n_neighbors", 1, 30)
                .categorical("weights", &["uniform", "distance"])
                .categorical("metric", &["euclidean", "manhattan"]),
            Algorithm::NaiveBayes => space.log_float("var_smoothing", 1e-12, 1e-6),
            Algorithm::LinearSVC => space.log_float("c", 1e-3, 100.0),
            Algorithm::RbfSVC => space.log_float("c", 1e-2, 100.0).log_float("gamma", 1e-4, 1.0),
        }
    }

    /// Read an algorithm's hyperparameters from a trial.
    ///
    /// Missing, mistyped or out-of-range values fail with `InvalidParameter`.
    pub fn from_trial(algorithm: Algorithm, trial: &Trial) -> Result<Self> {
        let space = Self::search_space(algorithm);
        let p = TrialReader { trial, space: &space };

        let params = match algorithm {
            Algorithm::LogisticRegression => Hyperparams::LogisticRegression(LogisticRegressionParams {
                alpha: p.float("alpha")?,
                learning_rate: p.float("learning_rate")?,
                max_iter: p.int("max_iter")?,
            }),
            Algorithm::DecisionTree => Hyperparams::DecisionTree(DecisionTreeParams {
                max_depth: Some(p.int("max_depth")?),
                min_samples_split: p.int("min_samples_split")?,
                min_samples_leaf: p.int("min_samples_leaf")?,
                criterion: p.choice("criterion")?,
            }),
            Algorithm::ExtraTree => Hyperparams::ExtraTree(ExtraTreeParams {
                max_depth: Some(p.int("max_depth")?),
                min_samples_split: p.int("min_samples_split")?,
                min_samples_leaf: p.int("min_samples_leaf")?,
            }),
            Algorithm::ExtraTrees => Hyperparams::ExtraTrees(ExtraTreesParams {
                n_estimators: p.int("n_estimators")?,
                max_depth: Some(p.int("max_depth")?),
                min_samples_leaf: p.int("min_samples_leaf")?,
            }),
            Algorithm::RandomForest => Hyperparams::RandomForest(RandomForestParams {
                n_estimators: p.int("n_estimators")?,
                max_depth: Some(p.int("max_depth")?),
                min_samples_leaf: p.int("min_samples_leaf")?,
                max_features: p.choice("max_features")?,
            }),
            Algorithm::Ridge => Hyperparams::Ridge(RidgeParams { alpha: p.float("alpha")? }),
            Algorithm::Perceptron => Hyperparams::Perceptron(PerceptronParams {
                alpha: p.float("alpha")?,
                eta0: p.float("eta0")?,
                max_iter: p.int("max_iter")?,
            }),
            Algorithm::PassiveAggressive => Hyperparams::PassiveAggressive(PassiveAggressiveParams {
                c: p.float("c")?,
                max_iter: p.int("max_iter")?,
            }),
            Algorithm::KNN => Hyperparams::KNN(KNNParams {
                n_neighbors: p.int("n_neighbors")?,
                weights: p.choice("weights")?,
                metric: p.choice("metric")?,
            }),
            Algorithm::NaiveBayes => Hyperparams::NaiveBayes(NaiveBayesParams {
                var_smoothing: p.float("var_smoothing")?,
            }),
            Algorithm::LinearSVC => Hyperparams::LinearSVC(LinearSVCParams { c: p.float("c")? }),
            Algorithm::RbfSVC => Hyperparams::RbfSVC(RbfSVCParams {
                c: p.float("c")?,
                gamma: Some(p.float("gamma")?),
            }),
        };

        params.validate()?;
        Ok(params)
    }

    /// Check values the models cannot work with
    pub fn validate(&self) -> Result<()> {
        match self {
            Hyperparams::LogisticRegression(p) => {
                non_negative("alpha", p.alpha)?;
                positive("learning_rate", p.learning_rate)?;
                at_least("max_iter", p.max_iter, 1)
            }
            Hyperparams::DecisionTree(p) => {
                depth(p.max_depth)?;
                at_least("min_samples_split", p.min_samples_split, 2)?;
                at_least("min_samples_leaf", p.min_samples_leaf, 1)
            }
            Hyperparams::ExtraTree(p) => {
                depth(p.max_depth)?;
                at_least("min_samples_split", p.min_samples_split, 2)?;
                at_least("min_samples_leaf", p.min_samples_leaf, 1)
            }
            Hyperparams::ExtraTrees(p) => {
                at_least("n_estimators", p.n_estimators, 1)?;
                depth(p.max_depth)?;
                at_least("min_samples_leaf", p.min_samples_leaf, 1)
            }
            Hyperparams::RandomForest(p) => {
                at_least("n_estimators", p.n_estimators, 1)?;
                depth(p.max_depth)?;
                at_least("min_samples_leaf", p.min_samples_leaf, 1)
            }
            Hyperparams::Ridge(p) => non_negative("alpha", p.alpha),
            Hyperparams::Perceptron(p) => {
                non_negative("alpha", p.alpha)?;
                positive("eta0", p.eta0)?;
                at_least("max_iter", p.max_iter, 1)
            }
            Hyperparams::PassiveAggressive(p) => {
                positive("c", p.c)?;
                at_least("max_iter", p.max_iter, 1)
            }
            Hyperparams::KNN(p) => at_least("n_neighbors", p.n_neighbors, 1),
            Hyperparams::NaiveBayes(p) => non_negative("var_smoothing", p.var_smoothing),
            Hyperparams::LinearSVC(p) => positive("c", p.c),
            Hyperparams::RbfSVC(p) => {
                positive("c", p.c)?;
                match p.gamma {
                    Some(gamma) => positive("gamma", gamma),
                    None => Ok(()),
                }
            }
        }
    }

    /// Parameter names and values only, without the algorithm tag
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            Hyperparams::LogisticRegression(p) => serde_json::to_value(p),
            Hyperparams::DecisionTree(p) => serde_json::to_value(p),
            Hyperparams::ExtraTree(p) => serde_json::to_value(p),
            Hyperparams::ExtraTrees(p) => serde_json::to_value(p),
            Hyperparams::RandomForest(p) => serde_json::to_value(p),
            Hyperparams::Ridge(p) => serde_json::to_value(p),
            Hyperparams::Perceptron(p) => serde_json::to_value(p),
            Hyperparams::PassiveAggressive(p) => serde_json::to_value(p),
            Hyperparams::KNN(p) => serde_json::to_value(p),
            Hyperparams::NaiveBayes(p) => serde_json::to_value(p),
            Hyperparams::LinearSVC(p) => serde_json::to_value(p),
            Hyperparams::RbfSVC(p) => serde_json::to_value(p),
        }?;
        Ok(value)
    }

    /// Inverse of [`Hyperparams::to_json`]; missing names take their defaults
    pub fn from_json(algorithm: Algorithm, value: &serde_json::Value) -> Result<Self> {
        fn parse<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T> {
            Ok(serde_json::from_value(value.clone())?)
        }

        let params = match algorithm {
            Algorithm::LogisticRegression => Hyperparams::LogisticRegression(parse(value)?),
            Algorithm::DecisionTree => Hyperparams::DecisionTree(parse(value)?),
            Algorithm::ExtraTree => Hyperparams::ExtraTree(parse(value)?),
            Algorithm::ExtraTrees => Hyperparams::ExtraTrees(parse(value)?),
            Algorithm::RandomForest => Hyperparams::RandomForest(parse(value)?),
            Algorithm::Ridge => Hyperparams::Ridge(parse(value)?),
            Algorithm::Perceptron => Hyperparams::Perceptron(parse(value)?),
            Algorithm::PassiveAggressive => Hyperparams::PassiveAggressive(parse(value)?),
            Algorithm::KNN => Hyperparams::KNN(parse(value)?),
            Algorithm::NaiveBayes => Hyperparams::NaiveBayes(parse(value)?),
            Algorithm::LinearSVC => Hyperparams::LinearSVC(parse(value)?),
            Algorithm::RbfSVC => Hyperparams::RbfSVC(parse(value)?),
        };

        params.validate()?;
        Ok(params)
    }
}

/// Typed, range-checked access to a trial's parameters
struct TrialReader<'a> {
    trial: &'a Trial,
    space: &'a SearchSpace,
}

impl TrialReader<'_> {
    fn checked(&self, name: &str) -> Result<&ParameterValue> {
        let value = self.trial.param(name)?;
        match self.space.get(name) {
            Some(param) if param.contains(value) => Ok(value),
            _ => Err(CarrotError::InvalidParameter {
                name: name.to_string(),
                value: value.to_string(),
                reason: "outside the search space".to_string(),
            }),
        }
    }

    fn float(&self, name: &str) -> Result<f64> {
        self.checked(name)?;
        self.trial.get_float(name)
    }

    fn int(&self, name: &str) -> Result<usize> {
        self.checked(name)?;
        let value = self.trial.get_int(name)?;
        usize::try_from(value).map_err(|_| CarrotError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: "must not be negative".to_string(),
        })
    }

    /// Categorical choice parsed through the target enum's serde names
    fn choice<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.checked(name)?;
        let choice = self.trial.get_categorical(name)?;
        serde_json::from_value(serde_json::Value::String(choice.to_string())).map_err(|_| {
            CarrotError::InvalidParameter {
                name: name.to_string(),
                value: choice.to_string(),
                reason: "unrecognized choice".to_string(),
            }
        })
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> CarrotError {
    CarrotError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, value, "must be positive"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, value, "must not be negative"))
    }
}

fn at_least(name: &str, value: usize, min: usize) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(invalid(name, value, &format!("must be at least {}", min)))
    }
}

fn depth(max_depth: Option<usize>) -> Result<()> {
    match max_depth {
        Some(0) => Err(invalid("max_depth", 0, "must be at least 1")),
        _ => Ok(()),
    }
}
