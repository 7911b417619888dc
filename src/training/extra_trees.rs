//! Extra Trees (Extremely Randomized Trees) ensemble
//!
//! Each split draws one random threshold per candidate feature and keeps the
//! best of those. Every tree sees the full training set, without bootstrap.

use super::decision_tree::{DecisionTreeClassifier, MaxFeatures};
use super::models::{check_binary_target, threshold, Model};
use super::random_forest::{forest_proba, grow_forest};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Extra Trees classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraTreesClassifier {
    trees: Vec<DecisionTreeClassifier>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features to consider per split
    pub max_features: MaxFeatures,
    pub random_state: Option<u64>,
    n_features: usize,
}

impl Default for ExtraTreesClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ExtraTreesClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            random_state: Some(42),
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        forest_proba(&self.trees, self.n_features, x)
    }
}

impl Model for ExtraTreesClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        if self.n_estimators == 0 {
            return Err(CarrotError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }

        let template = DecisionTreeClassifier::new_extra()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features);

        self.trees = grow_forest(&template, self.n_estimators, false, self.random_state, x, y);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.predict_proba(x)?, 0.5))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_trees_classifier() {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| {
            let shift = if i < 15 { -2.0 } else { 2.0 };
            shift + ((i * 3 + j) % 5) as f64 * 0.2
        });
        let y = Array1::from_iter((0..30).map(|i| if i < 15 { 0.0 } else { 1.0 }));

        let mut model = ExtraTreesClassifier::new(20);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let proba = model.decision_function(&x).unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let x = Array2::zeros((4, 1));
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let mut model = ExtraTreesClassifier::new(0);
        assert!(matches!(model.fit(&x, &y), Err(CarrotError::InvalidParameter { .. })));
    }
}
