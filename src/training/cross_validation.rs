//! Cross-validation splitters and scorers

use super::metrics::{ClassificationScores, Metric};
use super::models::Model;
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Cross-validation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// K-Fold cross-validation
    KFold { n_splits: usize, shuffle: bool },
    /// Stratified K-Fold (maintains class distribution)
    StratifiedKFold { n_splits: usize, shuffle: bool },
}

impl Default for CVStrategy {
    fn default() -> Self {
        CVStrategy::StratifiedKFold { n_splits: 5, shuffle: true }
    }
}

/// Serializable cross-validation settings used by the comparator and tuner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVConfig {
    /// Number of folds
    pub n_splits: usize,
    /// Keep the class ratio in every fold
    pub stratified: bool,
    /// Shuffle before splitting
    pub shuffle: bool,
    /// Seed for the shuffle
    pub random_state: Option<u64>,
}

impl Default for CVConfig {
    fn default() -> Self {
        Self {
            n_splits: 5,
            stratified: true,
            shuffle: true,
            random_state: Some(42),
        }
    }
}

impl CVConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_splits(mut self, n_splits: usize) -> Self {
        self.n_splits = n_splits;
        self
    }

    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Build the splitter these settings describe
    pub fn validator(&self) -> CrossValidator {
        let strategy = if self.stratified {
            CVStrategy::StratifiedKFold { n_splits: self.n_splits, shuffle: self.shuffle }
        } else {
            CVStrategy::KFold { n_splits: self.n_splits, shuffle: self.shuffle }
        };
        let cv = CrossValidator::new(strategy);
        match self.random_state {
            Some(seed) => cv.with_random_state(seed),
            None => cv,
        }
    }
}

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    strategy: CVStrategy,
    random_state: Option<u64>,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CVStrategy) -> Self {
        Self {
            strategy,
            random_state: None,
        }
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize, y: &Array1<f64>) -> Result<Vec<CVSplit>> {
        match &self.strategy {
            CVStrategy::KFold { n_splits, shuffle } => self.k_fold_split(n_samples, *n_splits, *shuffle),
            CVStrategy::StratifiedKFold { n_splits, shuffle } => {
                self.stratified_k_fold_split(n_samples, y, *n_splits, *shuffle)
            }
        }
    }

    fn check_n_splits(n_samples: usize, n_splits: usize) -> Result<()> {
        if n_splits < 2 {
            return Err(CarrotError::ValidationError("n_splits must be at least 2".to_string()));
        }
        if n_samples < n_splits {
            return Err(CarrotError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }
        Ok(())
    }

    fn k_fold_split(&self, n_samples: usize, n_splits: usize, shuffle: bool) -> Result<Vec<CVSplit>> {
        Self::check_n_splits(n_samples, n_splits)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            indices.shuffle(&mut self.rng());
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;
        let mut folds = Vec::with_capacity(n_splits);
        let mut current = 0;
        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            folds.push(indices[current..current + fold_size].to_vec());
            current += fold_size;
        }

        Ok(Self::splits_from_folds(folds))
    }

    fn stratified_k_fold_split(
        &self,
        n_samples: usize,
        y: &Array1<f64>,
        n_splits: usize,
        shuffle: bool,
    ) -> Result<Vec<CVSplit>> {
        Self::check_n_splits(n_samples, n_splits)?;
        if y.len() != n_samples {
            return Err(CarrotError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        // Ordered by class so the fold layout does not depend on hashing
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        if let Some((class, members)) = class_indices.iter().find(|(_, m)| m.len() < n_splits) {
            return Err(CarrotError::ValidationError(format!(
                "n_splits={} cannot be greater than the number of members in class {} ({})",
                n_splits,
                class,
                members.len()
            )));
        }

        if shuffle {
            let mut rng = self.rng();
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        // Deal each class round-robin, continuing where the previous class stopped
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut next = 0;
        for indices in class_indices.values() {
            for &idx in indices {
                folds[next % n_splits].push(idx);
                next += 1;
            }
        }

        Ok(Self::splits_from_folds(folds))
    }

    fn splits_from_folds(folds: Vec<Vec<usize>>) -> Vec<CVSplit> {
        (0..folds.len())
            .map(|fold_idx| {
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                CVSplit {
                    train_indices,
                    test_indices: folds[fold_idx].clone(),
                    fold_idx,
                }
            })
            .collect()
    }
}

/// Cross-validation results for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        let mean_score = scores.iter().sum::<f64>() / n_folds.max(1) as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds.max(1) as f64;

        Self {
            scores,
            mean_score,
            std_score: variance.sqrt(),
            n_folds,
        }
    }
}

/// One evaluated fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold_idx: usize,
    pub scores: ClassificationScores,
    pub fit_time_secs: f64,
}

/// Every catalogue metric for every fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub folds: Vec<FoldResult>,
}

impl CrossValidation {
    /// Fold-mean of every metric
    pub fn mean_scores(&self) -> ClassificationScores {
        let scores: Vec<ClassificationScores> = self.folds.iter().map(|f| f.scores).collect();
        ClassificationScores::mean(&scores)
    }

    /// Mean per-fold fit time in seconds
    pub fn mean_fit_time(&self) -> f64 {
        self.folds.iter().map(|f| f.fit_time_secs).sum::<f64>() / self.folds.len().max(1) as f64
    }

    pub fn results(&self, metric: Metric) -> CVResults {
        CVResults::from_scores(self.folds.iter().map(|f| f.scores.get(metric)).collect())
    }
}

/// Fit a fresh clone of `model` on every training split and score it on the
/// held-out rows. Folds run in parallel; results keep fold order and the first
/// failing fold's error is returned.
fn run_folds<M, S, F>(model: &M, x: &Array2<f64>, y: &Array1<f64>, cv: &CVConfig, score: F) -> Result<Vec<(S, f64)>>
where
    M: Model + Clone,
    S: Send,
    F: Fn(&Array1<f64>, &Array1<f64>, &Array1<f64>) -> Result<S> + Sync,
{
    if x.nrows() != y.len() {
        return Err(CarrotError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    let splits = cv.validator().split(x.nrows(), y)?;

    splits
        .par_iter()
        .map(|split| {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train = y.select(Axis(0), &split.train_indices);
            let x_test = x.select(Axis(0), &split.test_indices);
            let y_test = y.select(Axis(0), &split.test_indices);

            let mut fold_model = model.clone();
            let start = Instant::now();
            fold_model.fit(&x_train, &y_train)?;
            let fit_time_secs = start.elapsed().as_secs_f64();

            let y_pred = fold_model.predict(&x_test)?;
            let y_score = fold_model.decision_function(&x_test)?;
            let scores = score(&y_test, &y_pred, &y_score)?;

            debug!(fold = split.fold_idx, fit_time_secs, "Fold evaluated");
            Ok((scores, fit_time_secs))
        })
        .collect()
}

/// Every catalogue metric plus fit time for each fold
pub fn cross_validate<M>(model: &M, x: &Array2<f64>, y: &Array1<f64>, cv: &CVConfig) -> Result<CrossValidation>
where
    M: Model + Clone,
{
    let folds = run_folds(model, x, y, cv, ClassificationScores::compute)?
        .into_iter()
        .enumerate()
        .map(|(fold_idx, (scores, fit_time_secs))| FoldResult {
            fold_idx,
            scores,
            fit_time_secs,
        })
        .collect();

    Ok(CrossValidation { folds })
}

/// Per-fold scores of a single metric
pub fn cross_val_score<M>(model: &M, x: &Array2<f64>, y: &Array1<f64>, metric: Metric, cv: &CVConfig) -> Result<CVResults>
where
    M: Model + Clone,
{
    let scores = run_folds(model, x, y, cv, |y_true, y_pred, y_score| metric.score(y_true, y_pred, y_score))?;
    Ok(CVResults::from_scores(scores.into_iter().map(|(s, _)| s).collect()))
}
