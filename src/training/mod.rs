//! Model zoo and model evaluation
//!
//! Provides the binary classifiers behind the algorithm catalogue:
//! - Logistic regression and ridge classifier
//! - Decision tree, extra tree, random forest and extra trees
//! - Perceptron and passive-aggressive
//! - K-Nearest Neighbors
//! - Gaussian Naive Bayes
//! - Support Vector Machines (linear and RBF)
//!
//! plus the metric catalogue and (stratified) k-fold cross-validation.

mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod extra_trees;
pub mod knn;
pub mod linear_models;
pub mod metrics;
pub mod naive_bayes;
pub mod random_forest;
pub mod sgd;
pub mod svm;

pub use cross_validation::{
    cross_val_score, cross_validate, CVConfig, CVResults, CVSplit, CVStrategy, CrossValidation, CrossValidator,
    FoldResult,
};
pub use decision_tree::{Criterion, DecisionTreeClassifier, MaxFeatures, Splitter, TreeNode};
pub use extra_trees::ExtraTreesClassifier;
pub use knn::{DistanceMetric, KNNClassifier, KNNConfig, WeightScheme};
pub use linear_models::{LogisticRegression, RidgeClassifier};
pub use metrics::{roc_auc_score, ClassificationScores, ConfusionCounts, Metric};
pub use models::{Model, ModelInstance};
pub use naive_bayes::GaussianNaiveBayes;
pub use random_forest::RandomForestClassifier;
pub use sgd::{PassiveAggressiveClassifier, Perceptron};
pub use svm::{KernelType, SVMClassifier, SVMConfig};
