//! Online linear classifiers: perceptron and passive-aggressive
//!
//! Both process one sample at a time over seeded, shuffled epochs.

use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

fn signed_labels(y: &Array1<f64>) -> Vec<f64> {
    y.iter().map(|&v| if v > 0.5 { 1.0 } else { -1.0 }).collect()
}

fn epoch_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
        None => Xoshiro256PlusPlus::from_entropy(),
    }
}

fn margin(w: &Array1<f64>, b: f64, xi: ArrayView1<f64>) -> f64 {
    xi.dot(w) + b
}

fn linear_scores(weights: Option<&Array1<f64>>, bias: f64, x: &Array2<f64>) -> Result<Array1<f64>> {
    let w = weights.ok_or(CarrotError::ModelNotFitted)?;
    check_features(x, w.len())?;
    Ok(x.dot(w) + bias)
}

fn finish(w: Array1<f64>, b: f64, name: &str) -> Result<(Array1<f64>, f64)> {
    if w.iter().any(|v| !v.is_finite()) || !b.is_finite() {
        return Err(CarrotError::TrainingError(format!("{} diverged", name)));
    }
    Ok((w, b))
}

// ============ Perceptron ============

/// Perceptron: SGD on the perceptron loss with a constant learning rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perceptron {
    /// L2 penalty applied at every update
    pub alpha: f64,
    /// Constant learning rate
    pub eta0: f64,
    /// Maximum number of epochs
    pub max_iter: usize,
    pub random_state: Option<u64>,
    pub weights: Option<Array1<f64>>,
    pub bias: f64,
}

impl Default for Perceptron {
    fn default() -> Self {
        Self::new()
    }
}

impl Perceptron {
    pub fn new() -> Self {
        Self {
            alpha: 1e-4,
            eta0: 1.0,
            max_iter: 1000,
            random_state: Some(42),
            weights: None,
            bias: 0.0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_eta0(mut self, eta0: f64) -> Self {
        self.eta0 = eta0;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Model for Perceptron {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        let y_signed = signed_labels(y);

        let mut rng = epoch_rng(self.random_state);
        let mut w = Array1::zeros(x.ncols());
        let mut b = 0.0;
        let mut indices: Vec<usize> = (0..x.nrows()).collect();
        let decay = (1.0 - self.eta0 * self.alpha).max(0.0);

        for _epoch in 0..self.max_iter {
            indices.shuffle(&mut rng);
            let mut mistakes = 0;

            for &i in &indices {
                let xi = x.row(i);
                let yi = y_signed[i];
                if self.alpha > 0.0 {
                    w *= decay;
                }
                if yi * margin(&w, b, xi) <= 0.0 {
                    w.scaled_add(self.eta0 * yi, &xi);
                    b += self.eta0 * yi;
                    mistakes += 1;
                }
            }

            if mistakes == 0 {
                break;
            }
        }

        let (w, b) = finish(w, b, "Perceptron")?;
        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.decision_function(x)?, 0.0))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_scores(self.weights.as_ref(), self.bias, x)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

// ============ Passive-Aggressive ============

/// Passive-aggressive classifier (PA-I, hinge loss with step capped at `c`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveAggressiveClassifier {
    /// Maximum step size
    pub c: f64,
    /// Maximum number of epochs
    pub max_iter: usize,
    /// Minimum improvement of the mean epoch loss
    pub tol: f64,
    /// Epochs without improvement before stopping
    pub n_iter_no_change: usize,
    pub random_state: Option<u64>,
    pub weights: Option<Array1<f64>>,
    pub bias: f64,
}

impl Default for PassiveAggressiveClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PassiveAggressiveClassifier {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-3,
            n_iter_no_change: 5,
            random_state: Some(42),
            weights: None,
            bias: 0.0,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Model for PassiveAggressiveClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        let y_signed = signed_labels(y);
        let n = x.nrows();

        let mut rng = epoch_rng(self.random_state);
        let mut w = Array1::zeros(x.ncols());
        let mut b = 0.0;
        let mut indices: Vec<usize> = (0..n).collect();
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;

        for _epoch in 0..self.max_iter {
            indices.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for &i in &indices {
                let xi = x.row(i);
                let yi = y_signed[i];
                let loss = (1.0 - yi * margin(&w, b, xi)).max(0.0);
                if loss > 0.0 {
                    // the intercept acts as a constant feature of 1
                    let sq_norm = xi.dot(&xi) + 1.0;
                    let tau = self.c.min(loss / sq_norm);
                    w.scaled_add(tau * yi, &xi);
                    b += tau * yi;
                    epoch_loss += loss;
                }
            }

            epoch_loss /= n as f64;
            if epoch_loss == 0.0 {
                break;
            }
            if epoch_loss > best_loss - self.tol {
                no_improvement += 1;
                if no_improvement >= self.n_iter_no_change {
                    break;
                }
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(epoch_loss);
        }

        let (w, b) = finish(w, b, "PassiveAggressive")?;
        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.decision_function(x)?, 0.0))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_scores(self.weights.as_ref(), self.bias, x)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [-2.0, -1.0],
            [-1.5, -2.0],
            [-1.0, -1.5],
            [-2.5, -0.5],
            [1.0, 1.5],
            [2.0, 1.0],
            [1.5, 2.5],
            [0.5, 2.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_perceptron_separable() {
        let (x, y) = separable();
        let mut model = Perceptron::new().with_alpha(0.0);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_passive_aggressive_separable() {
        let (x, y) = separable();
        let mut model = PassiveAggressiveClassifier::new();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let scores = model.decision_function(&x).unwrap();
        assert!(scores[0] < 0.0 && scores[4] > 0.0);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = separable();
        let mut a = Perceptron::new();
        let mut b = Perceptron::new();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.weights, b.weights);
    }

    #[test]
    fn test_unfitted() {
        let (x, _) = separable();
        assert!(matches!(Perceptron::new().predict(&x), Err(CarrotError::ModelNotFitted)));
        assert!(!PassiveAggressiveClassifier::new().is_fitted());
    }
}
