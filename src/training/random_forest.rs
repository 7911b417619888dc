//! Random forest classifier

use super::decision_tree::{tree_rng, DecisionTreeClassifier, MaxFeatures};
use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Grow `n_estimators` copies of `template` in parallel.
///
/// Tree `i` draws from its own RNG seeded with `seed + i`, so the forest
/// does not depend on thread scheduling.
pub(crate) fn grow_forest(
    template: &DecisionTreeClassifier,
    n_estimators: usize,
    bootstrap: bool,
    seed: Option<u64>,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Vec<DecisionTreeClassifier> {
    let n_samples = x.nrows();
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    (0..n_estimators)
        .into_par_iter()
        .map(|tree_idx| {
            let mut rng = tree_rng(Some(base_seed.wrapping_add(tree_idx as u64)));
            let indices: Vec<usize> = if bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let mut tree = template.clone();
            tree.fit_rows(x, y, &indices, &mut rng);
            tree
        })
        .collect()
}

/// Average positive-class fraction over all trees
pub(crate) fn forest_proba(trees: &[DecisionTreeClassifier], n_features: usize, x: &Array2<f64>) -> Result<Array1<f64>> {
    if trees.is_empty() {
        return Err(CarrotError::ModelNotFitted);
    }
    check_features(x, n_features)?;

    let per_tree = trees
        .par_iter()
        .map(|tree| tree.predict_proba(x))
        .collect::<Result<Vec<Array1<f64>>>>()?;

    let mut sum: Array1<f64> = Array1::zeros(x.nrows());
    for proba in &per_tree {
        sum += proba;
    }
    Ok(sum / trees.len() as f64)
}

/// Bootstrap-aggregated CART trees with per-split feature subsampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub random_state: Option<u64>,
    n_features: usize,
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
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

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        forest_proba(&self.trees, self.n_features, x)
    }
}

impl Model for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        if self.n_estimators == 0 {
            return Err(CarrotError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }

        let template = DecisionTreeClassifier::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features);

        self.trees = grow_forest(&template, self.n_estimators, self.bootstrap, self.random_state, x, y);
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

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 3), |(i, j)| {
            let shift = if i < 20 { 0.0 } else { 4.0 };
            shift + ((i * 5 + j * 11) % 7) as f64 * 0.3
        });
        let y = Array1::from_iter((0..40).map(|i| if i < 20 { 0.0 } else { 1.0 }));
        (x, y)
    }

    #[test]
    fn test_random_forest_fits_blobs() {
        let (x, y) = blobs();
        let mut forest = RandomForestClassifier::new(15);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_random_forest_is_deterministic() {
        let (x, y) = blobs();
        let mut a = RandomForestClassifier::new(10).with_max_features(MaxFeatures::Log2);
        let mut b = RandomForestClassifier::new(10).with_max_features(MaxFeatures::Log2);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_unfitted_forest() {
        let (x, _) = blobs();
        let forest = RandomForestClassifier::default();
        assert!(!forest.is_fitted());
        assert!(matches!(forest.predict(&x), Err(CarrotError::ModelNotFitted)));
    }
}
