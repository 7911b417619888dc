//! Model trait and the closed set of model instances

use super::{
    decision_tree::DecisionTreeClassifier,
    extra_trees::ExtraTreesClassifier,
    knn::KNNClassifier,
    linear_models::{LogisticRegression, RidgeClassifier},
    naive_bayes::GaussianNaiveBayes,
    random_forest::RandomForestClassifier,
    sgd::{PassiveAggressiveClassifier, Perceptron},
    svm::SVMClassifier,
};
use crate::error::{CarrotError, Result};
use crate::modelling::Algorithm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Trait for binary classifiers over labels 0/1
pub trait Model: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict class labels (0.0 or 1.0)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Continuous score where larger means more likely positive
    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn is_fitted(&self) -> bool;
}

/// Validate a training set for a binary classifier.
///
/// Requires matching lengths, at least one row and column, finite features
/// and labels drawn from {0, 1} with both classes present.
pub(crate) fn check_binary_target(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(CarrotError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(CarrotError::TrainingError("Empty training set".to_string()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(CarrotError::TrainingError("Features contain NaN or infinite values".to_string()));
    }
    if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        return Err(CarrotError::TrainingError(format!("Labels must be 0 or 1, found {}", bad)));
    }
    let n_positive = y.iter().filter(|&&v| v == 1.0).count();
    if n_positive == 0 || n_positive == y.len() {
        return Err(CarrotError::TrainingError(
            "Training labels contain a single class".to_string(),
        ));
    }
    Ok(())
}

/// Validate the feature matrix handed to a fitted model
pub(crate) fn check_features(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(CarrotError::ShapeError {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

/// Threshold continuous scores into 0/1 labels
pub(crate) fn threshold(scores: &Array1<f64>, cut: f64) -> Array1<f64> {
    scores.mapv(|s| if s > cut { 1.0 } else { 0.0 })
}

/// One model from the algorithm catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelInstance {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTreeClassifier),
    ExtraTree(DecisionTreeClassifier),
    ExtraTrees(ExtraTreesClassifier),
    RandomForest(RandomForestClassifier),
    Ridge(RidgeClassifier),
    Perceptron(Perceptron),
    PassiveAggressive(PassiveAggressiveClassifier),
    KNN(KNNClassifier),
    NaiveBayes(GaussianNaiveBayes),
    LinearSVC(SVMClassifier),
    RbfSVC(SVMClassifier),
}

impl ModelInstance {
    /// Catalogue identifier of this model
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ModelInstance::LogisticRegression(_) => Algorithm::LogisticRegression,
            ModelInstance::DecisionTree(_) => Algorithm::DecisionTree,
            ModelInstance::ExtraTree(_) => Algorithm::ExtraTree,
            ModelInstance::ExtraTrees(_) => Algorithm::ExtraTrees,
            ModelInstance::RandomForest(_) => Algorithm::RandomForest,
            ModelInstance::Ridge(_) => Algorithm::Ridge,
            ModelInstance::Perceptron(_) => Algorithm::Perceptron,
            ModelInstance::PassiveAggressive(_) => Algorithm::PassiveAggressive,
            ModelInstance::KNN(_) => Algorithm::KNN,
            ModelInstance::NaiveBayes(_) => Algorithm::NaiveBayes,
            ModelInstance::LinearSVC(_) => Algorithm::LinearSVC,
            ModelInstance::RbfSVC(_) => Algorithm::RbfSVC,
        }
    }

    fn inner(&self) -> &dyn Model {
        match self {
            ModelInstance::LogisticRegression(m) => m,
            ModelInstance::DecisionTree(m) => m,
            ModelInstance::ExtraTree(m) => m,
            ModelInstance::ExtraTrees(m) => m,
            ModelInstance::RandomForest(m) => m,
            ModelInstance::Ridge(m) => m,
            ModelInstance::Perceptron(m) => m,
            ModelInstance::PassiveAggressive(m) => m,
            ModelInstance::KNN(m) => m,
            ModelInstance::NaiveBayes(m) => m,
            ModelInstance::LinearSVC(m) | ModelInstance::RbfSVC(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Model {
        match self {
            ModelInstance::LogisticRegression(m) => m,
            ModelInstance::DecisionTree(m) => m,
            ModelInstance::ExtraTree(m) => m,
            ModelInstance::ExtraTrees(m) => m,
            ModelInstance::RandomForest(m) => m,
            ModelInstance::Ridge(m) => m,
            ModelInstance::Perceptron(m) => m,
            ModelInstance::PassiveAggressive(m) => m,
            ModelInstance::KNN(m) => m,
            ModelInstance::NaiveBayes(m) => m,
            ModelInstance::LinearSVC(m) | ModelInstance::RbfSVC(m) => m,
        }
    }
}

impl Model for ModelInstance {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().decision_function(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_binary_target() {
        let x = array![[0.0], [1.0], [2.0]];
        assert!(check_binary_target(&x, &array![0.0, 1.0, 1.0]).is_ok());
        assert!(matches!(
            check_binary_target(&x, &array![0.0, 1.0]),
            Err(CarrotError::ShapeError { .. })
        ));
        assert!(check_binary_target(&x, &array![0.0, 2.0, 1.0]).is_err());
        assert!(check_binary_target(&x, &array![1.0, 1.0, 1.0]).is_err());
        assert!(check_binary_target(&array![[f64::NAN], [1.0], [2.0]], &array![0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_instance_dispatch() {
        let x = array![[0.0], [0.1], [0.2], [0.9], [1.0], [1.1]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = ModelInstance::NaiveBayes(GaussianNaiveBayes::new());
        assert!(!model.is_fitted());
        assert_eq!(model.algorithm(), Algorithm::NaiveBayes);
        assert!(matches!(model.predict(&x), Err(CarrotError::ModelNotFitted)));

        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(&x).unwrap(), y);
    }
}
