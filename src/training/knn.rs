//! K-Nearest Neighbors classifier

use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Distance metric for KNN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    #[default]
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
}

/// Weighting scheme for neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

/// KNN configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
    /// Distance metric
    pub metric: DistanceMetric,
    /// Weighting scheme
    pub weights: WeightScheme,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
        }
    }
}

/// K-Nearest Neighbors Classifier (brute force)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    pub config: KNNConfig,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KNNClassifier {
    fn default() -> Self {
        Self::new(KNNConfig::default())
    }
}

impl KNNClassifier {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
        }
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    /// Weighted fraction of positive neighbors (parallelized over samples)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(CarrotError::ModelNotFitted),
        };
        check_features(x, x_train.ncols())?;

        let k = self.config.n_neighbors;
        if k == 0 || k > x_train.nrows() {
            return Err(CarrotError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: k.to_string(),
                reason: format!("must be between 1 and the number of training samples ({})", x_train.nrows()),
            });
        }

        let metric = self.config.metric;
        let weights = self.config.weights;
        let probs: Vec<f64> = x
            .rows()
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|row| {
                let point = row.to_vec();
                let neighbors = find_k_nearest(&point, x_train, k, metric);
                positive_fraction(&neighbors, y_train, weights)
            })
            .collect();

        Ok(Array1::from_vec(probs))
    }
}

impl Model for KNNClassifier {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.predict_proba(x)?, 0.5))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }

    fn is_fitted(&self) -> bool {
        self.x_train.is_some()
    }
}

/// Max-heap entry ordered by distance, then training index
#[derive(PartialEq)]
struct Neighbor {
    dist: f64,
    index: usize,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.total_cmp(&other.dist).then(self.index.cmp(&other.index))
    }
}

/// Find k nearest neighbors using a bounded max-heap, O(n log k)
fn find_k_nearest(point: &[f64], x_train: &Array2<f64>, k: usize, metric: DistanceMetric) -> Vec<Neighbor> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (index, row) in x_train.rows().into_iter().enumerate() {
        let dist = compute_distance(point, row.iter(), metric);
        let candidate = Neighbor { dist, index };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(top) = heap.peek() {
            if candidate < *top {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_vec()
}

fn compute_distance<'a>(a: &[f64], b: impl Iterator<Item = &'a f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b)
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b).map(|(ai, bi)| (ai - bi).abs()).sum(),
    }
}

/// Exact matches take all the weight under distance weighting
fn positive_fraction(neighbors: &[Neighbor], y_train: &Array1<f64>, weights: WeightScheme) -> f64 {
    let exact = neighbors.iter().any(|n| n.dist == 0.0);
    let weight = |n: &Neighbor| match weights {
        WeightScheme::Uniform => 1.0,
        WeightScheme::Distance if exact => {
            if n.dist == 0.0 { 1.0 } else { 0.0 }
        }
        WeightScheme::Distance => 1.0 / n.dist,
    };

    let (mut positive, mut total) = (0.0, 0.0);
    for n in neighbors {
        let w = weight(n);
        total += w;
        if y_train[n.index] > 0.5 {
            positive += w;
        }
    }
    if total > 0.0 { positive / total } else { 0.0 }
}
