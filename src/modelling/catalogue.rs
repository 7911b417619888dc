//! Algorithm catalogue and argument validation

use crate::error::{CarrotError, Result};
use crate::training::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of algorithms that can be compared and tuned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "lr")]
    LogisticRegression,
    #[serde(rename = "dt")]
    DecisionTree,
    #[serde(rename = "extratree")]
    ExtraTree,
    #[serde(rename = "extratrees")]
    ExtraTrees,
    #[serde(rename = "rf")]
    RandomForest,
    #[serde(rename = "ridge")]
    Ridge,
    #[serde(rename = "perceptron")]
    Perceptron,
    #[serde(rename = "passive-aggressive")]
    PassiveAggressive,
    #[serde(rename = "knn")]
    KNN,
    #[serde(rename = "nb")]
    NaiveBayes,
    #[serde(rename = "linearsvc")]
    LinearSVC,
    #[serde(rename = "rbfsvc")]
    RbfSVC,
}

impl Algorithm {
    /// Every catalogue entry, in catalogue order
    pub fn all() -> Vec<Algorithm> {
        vec![
            Algorithm::LogisticRegression,
            Algorithm::DecisionTree,
            Algorithm::ExtraTree,
            Algorithm::ExtraTrees,
            Algorithm::RandomForest,
            Algorithm::Ridge,
            Algorithm::Perceptron,
            Algorithm::PassiveAggressive,
            Algorithm::KNN,
            Algorithm::NaiveBayes,
            Algorithm::LinearSVC,
            Algorithm::RbfSVC,
        ]
    }

    /// Catalogue identifier
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::LogisticRegression => "lr",
            Algorithm::DecisionTree => "dt",
            Algorithm::ExtraTree => "extratree",
            Algorithm::ExtraTrees => "extratrees",
            Algorithm::RandomForest => "rf",
            Algorithm::Ridge => "ridge",
            Algorithm::Perceptron => "perceptron",
            Algorithm::PassiveAggressive => "passive-aggressive",
            Algorithm::KNN => "knn",
            Algorithm::NaiveBayes => "nb",
            Algorithm::LinearSVC => "linearsvc",
            Algorithm::RbfSVC => "rbfsvc",
        }
    }

    /// Human-readable model name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::LogisticRegression => "Logistic Regression",
            Algorithm::DecisionTree => "Decision Tree",
            Algorithm::ExtraTree => "Extra Tree",
            Algorithm::ExtraTrees => "Extra Trees",
            Algorithm::RandomForest => "Random Forest",
            Algorithm::Ridge => "Ridge Classifier",
            Algorithm::Perceptron => "Perceptron",
            Algorithm::PassiveAggressive => "Passive Aggressive",
            Algorithm::KNN => "K-Nearest Neighbors",
            Algorithm::NaiveBayes => "Gaussian Naive Bayes",
            Algorithm::LinearSVC => "Linear SVC",
            Algorithm::RbfSVC => "RBF SVC",
        }
    }

    /// Scale-sensitive algorithms only accept setups with scaled features
    pub fn requires_scaling(&self) -> bool {
        matches!(
            self,
            Algorithm::LogisticRegression
                | Algorithm::Ridge
                | Algorithm::Perceptron
                | Algorithm::PassiveAggressive
                | Algorithm::KNN
                | Algorithm::LinearSVC
                | Algorithm::RbfSVC
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = CarrotError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::all()
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| CarrotError::UnknownAlgorithm(s.to_string()))
    }
}

/// Resolve an include list, keeping order and duplicates.
/// `None` selects the whole catalogue.
pub fn check_include(include: Option<&[String]>) -> Result<Vec<Algorithm>> {
    match include {
        None => Ok(Algorithm::all()),
        Some(ids) => ids.iter().map(|id| id.parse()).collect(),
    }
}

pub fn check_metric(metric: &str) -> Result<Metric> {
    metric.parse()
}

/// Reject scale-sensitive algorithms on unscaled features
pub fn check_feature_scaling(algorithms: &[Algorithm], feature_scaling: bool) -> Result<()> {
    if feature_scaling {
        return Ok(());
    }
    match algorithms.iter().find(|a| a.requires_scaling()) {
        Some(algorithm) => Err(CarrotError::FeatureScaling {
            algorithm: algorithm.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for algorithm in Algorithm::all() {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!(Algorithm::all().len(), 12);
        assert_eq!(
            serde_json::to_string(&Algorithm::PassiveAggressive).unwrap(),
            "\"passive-aggressive\""
        );
    }

    #[test]
    fn test_check_include() {
        assert_eq!(check_include(None).unwrap(), Algorithm::all());

        let ids = vec!["knn".to_string(), "lr".to_string(), "knn".to_string()];
        assert_eq!(
            check_include(Some(&ids)).unwrap(),
            vec![Algorithm::KNN, Algorithm::LogisticRegression, Algorithm::KNN]
        );

        let bad = vec!["lr".to_string(), "xgboost".to_string()];
        let err = check_include(Some(&bad)).unwrap_err();
        assert!(matches!(&err, CarrotError::UnknownAlgorithm(id) if id == "xgboost"));
        assert!(err.to_string().contains("include parameter"));
    }

    #[test]
    fn test_check_metric() {
        assert_eq!(check_metric("roc_auc").unwrap(), Metric::RocAuc);
        assert!(matches!(check_metric("algorithm"), Err(CarrotError::UnknownMetric(_))));
        assert!(matches!(check_metric("F1"), Err(CarrotError::UnknownMetric(_))));
    }

    #[test]
    fn test_check_feature_scaling() {
        let trees = [Algorithm::DecisionTree, Algorithm::RandomForest, Algorithm::NaiveBayes];
        assert!(check_feature_scaling(&trees, false).is_ok());

        let mixed = [Algorithm::DecisionTree, Algorithm::KNN];
        assert!(check_feature_scaling(&mixed, true).is_ok());
        assert!(matches!(
            check_feature_scaling(&mixed, false),
            Err(CarrotError::FeatureScaling { algorithm }) if algorithm == "knn"
        ));
    }
}
