//! Decision tree classifier
//!
//! A binary CART tree. Leaves store the fraction of positive samples, which
//! doubles as the decision score. With [`Splitter::Random`] the tree picks one
//! random threshold per candidate feature instead of scanning all of them,
//! which is the building block of extremely randomized trees.

use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the positive-class fraction
    Leaf { proba: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    fn predict_sample(&self, sample: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { proba, .. } => *proba,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    left.predict_sample(sample)
                } else {
                    right.predict_sample(sample)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Gini,
    Entropy,
}

impl Criterion {
    fn impurity(self, n: usize, n_pos: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let p1 = n_pos as f64 / n as f64;
        let p0 = 1.0 - p1;
        match self {
            Criterion::Gini => 1.0 - p0 * p0 - p1 * p1,
            Criterion::Entropy => [p0, p1]
                .iter()
                .filter(|&&p| p > 0.0)
                .map(|&p| -p * p.ln())
                .sum(),
        }
    }

    fn weighted(self, left: (usize, usize), right: (usize, usize)) -> f64 {
        let n = (left.0 + right.0) as f64;
        (left.0 as f64 * self.impurity(left.0, left.1) + right.0 as f64 * self.impurity(right.0, right.1)) / n
    }
}

/// How split thresholds are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Splitter {
    /// Scan every threshold of every candidate feature
    Best,
    /// One uniform random threshold per candidate feature
    Random,
}

/// Number of features considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaxFeatures::Sqrt => "sqrt",
            MaxFeatures::Log2 => "log2",
            MaxFeatures::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    root: Option<TreeNode>,
    /// Maximum depth, `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Impurity criterion
    pub criterion: Criterion,
    pub splitter: Splitter,
    pub random_state: Option<u64>,
    n_features: usize,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    /// CART tree searching every feature for the best split
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            criterion: Criterion::Gini,
            splitter: Splitter::Best,
            random_state: Some(42),
            n_features: 0,
        }
    }

    /// Extremely randomized single tree
    pub fn new_extra() -> Self {
        Self {
            max_features: MaxFeatures::Sqrt,
            splitter: Splitter::Random,
            ..Self::new()
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit on a subset of rows (possibly repeated) with a caller-owned RNG.
    /// Labels are assumed to be validated already.
    pub(crate) fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], rng: &mut ChaCha8Rng) {
        self.n_features = x.ncols();
        self.root = Some(self.grow(x, y, indices, 0, rng));
    }

    /// Positive-class fraction of the leaf each row lands in
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CarrotError::ModelNotFitted)?;
        check_features(x, self.n_features)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| root.predict_sample(&row.to_vec()))
            .collect())
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_leaves)
    }

    fn grow(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize, rng: &mut ChaCha8Rng) -> TreeNode {
        let n = indices.len();
        let n_pos = indices.iter().filter(|&&i| y[i] > 0.5).count();
        let leaf = TreeNode::Leaf {
            proba: n_pos as f64 / n.max(1) as f64,
            n_samples: n,
        };

        let should_stop = n < self.min_samples_split
            || n < 2 * self.min_samples_leaf
            || n_pos == 0
            || n_pos == n
            || self.max_depth.map_or(false, |d| depth >= d);
        if should_stop {
            return leaf;
        }

        let features = self.candidate_features(x.ncols(), rng);
        let best = match self.splitter {
            Splitter::Best => self.best_split(x, y, indices, n_pos, &features),
            Splitter::Random => self.random_split(x, y, indices, &features, rng),
        };
        let Some(split) = best else {
            return leaf;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| x[[i, split.feature]] <= split.threshold);

        let left = Box::new(self.grow(x, y, &left_indices, depth + 1, rng));
        let right = Box::new(self.grow(x, y, &right_indices, depth + 1, rng));

        TreeNode::Split {
            feature_idx: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples: n,
        }
    }

    fn candidate_features(&self, n_features: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let k = self.max_features.resolve(n_features);
        if k >= n_features {
            return (0..n_features).collect();
        }
        let mut features = rand::seq::index::sample(rng, n_features, k).into_vec();
        features.sort_unstable();
        features
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        n_pos: usize,
        features: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.min_samples_leaf;
        let criterion = self.criterion;

        // Each feature finds its own best threshold; order is kept for the reduction
        let per_feature: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature| {
                let mut order = indices.to_vec();
                order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

                let mut best: Option<SplitCandidate> = None;
                let mut left_pos = 0;
                for k in 0..n - 1 {
                    if y[order[k]] > 0.5 {
                        left_pos += 1;
                    }
                    let left_n = k + 1;
                    let value = x[[order[k], feature]];
                    let next = x[[order[k + 1], feature]];
                    if value == next || left_n < min_leaf || n - left_n < min_leaf {
                        continue;
                    }

                    let impurity = criterion.weighted((left_n, left_pos), (n - left_n, n_pos - left_pos));
                    if best.map_or(true, |b| impurity < b.impurity) {
                        let mut threshold = (value + next) / 2.0;
                        if threshold >= next {
                            threshold = value;
                        }
                        best = Some(SplitCandidate { feature, threshold, impurity });
                    }
                }
                best
            })
            .collect();

        lowest_impurity(per_feature)
    }

    fn random_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let mut candidates = Vec::with_capacity(features.len());

        for &feature in features {
            let (fmin, fmax) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                let v = x[[i, feature]];
                (lo.min(v), hi.max(v))
            });
            if fmax <= fmin {
                continue;
            }

            let threshold = rng.gen_range(fmin..fmax);
            let (mut left, mut right) = ((0usize, 0usize), (0usize, 0usize));
            for &i in indices {
                let side = if x[[i, feature]] <= threshold { &mut left } else { &mut right };
                side.0 += 1;
                if y[i] > 0.5 {
                    side.1 += 1;
                }
            }
            if left.0 < self.min_samples_leaf || right.0 < self.min_samples_leaf {
                continue;
            }

            candidates.push(Some(SplitCandidate {
                feature,
                threshold,
                impurity: self.criterion.weighted(left, right),
            }));
        }

        lowest_impurity(candidates)
    }
}

/// First candidate with the lowest impurity
fn lowest_impurity(candidates: Vec<Option<SplitCandidate>>) -> Option<SplitCandidate> {
    candidates.into_iter().flatten().fold(None, |best: Option<SplitCandidate>, c| match best {
        Some(b) if b.impurity <= c.impurity => Some(b),
        _ => Some(c),
    })
}

pub(crate) fn tree_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

impl Model for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = tree_rng(self.random_state);
        self.fit_rows(x, y, &indices, &mut rng);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.predict_proba(x)?, 0.5))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}
