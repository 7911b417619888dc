//! Gaussian Naive Bayes for continuous features

use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-class Gaussian statistics, indexed by class label (0 and 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassStats {
    means: Vec<f64>,
    variances: Vec<f64>,
    log_prior: f64,
}

/// Gaussian Naive Bayes Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    classes: Option<[ClassStats; 2]>,
    /// Portion of the largest feature variance added to every variance
    pub var_smoothing: f64,
    n_features: usize,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            classes: None,
            var_smoothing: 1e-9,
            n_features: 0,
        }
    }

    /// Set variance smoothing parameter
    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    /// Posterior probability of class 1
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let classes = self.classes.as_ref().ok_or(CarrotError::ModelNotFitted)?;
        check_features(x, self.n_features)?;

        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let joint = [
                    classes[0].log_prior + log_likelihood(row, &classes[0]),
                    classes[1].log_prior + log_likelihood(row, &classes[1]),
                ];
                // log-sum-exp normalization
                let max_val = joint[0].max(joint[1]);
                let log_sum = ((joint[0] - max_val).exp() + (joint[1] - max_val).exp()).ln();
                (joint[1] - max_val - log_sum).exp()
            })
            .collect())
    }

    /// Class priors as `[P(0), P(1)]`
    pub fn class_priors(&self) -> Option<[f64; 2]> {
        self.classes
            .as_ref()
            .map(|c| [c[0].log_prior.exp(), c[1].log_prior.exp()])
    }
}

impl Model for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let max_variance = x
            .columns()
            .into_iter()
            .map(|col| col.var(0.0))
            .fold(0.0_f64, f64::max);
        let epsilon = self.var_smoothing * max_variance;

        let stats = |label: f64| -> ClassStats {
            // Single-pass Welford's algorithm for mean and variance
            let mut means = vec![0.0; n_features];
            let mut m2 = vec![0.0; n_features];
            let mut count = 0usize;
            for (row, _) in x.rows().into_iter().zip(y.iter()).filter(|(_, &yi)| yi == label) {
                count += 1;
                for (j, &val) in row.iter().enumerate() {
                    let delta = val - means[j];
                    means[j] += delta / count as f64;
                    m2[j] += delta * (val - means[j]);
                }
            }
            let variances = m2.iter().map(|&m| m / count as f64 + epsilon).collect();
            ClassStats {
                means,
                variances,
                log_prior: (count as f64 / n_samples as f64).ln(),
            }
        };

        let classes = [stats(0.0), stats(1.0)];
        if classes.iter().any(|c| c.variances.iter().any(|&v| v <= 0.0)) {
            return Err(CarrotError::TrainingError(
                "zero feature variance; increase var_smoothing".to_string(),
            ));
        }

        self.classes = Some(classes);
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.predict_proba(x)?, 0.5))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }

    fn is_fitted(&self) -> bool {
        self.classes.is_some()
    }
}

fn log_likelihood(x: ArrayView1<f64>, stats: &ClassStats) -> f64 {
    x.iter()
        .zip(stats.means.iter())
        .zip(stats.variances.iter())
        .map(|((&xi, &mean), &var)| -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_classification_data() -> (Array2<f64>, Array1<f64>) {
        // Two well-separated Gaussian clusters
        let x = Array2::from_shape_vec((20, 2), vec![
            -1.0, -1.0, -0.5, -0.5, 0.0, 0.0, 0.5, 0.5, -1.0, 0.0,
            -0.5, 0.5, 0.0, -0.5, 0.5, -1.0, -0.2, -0.8, -0.8, -0.2,
            4.0, 4.0, 4.5, 4.5, 5.0, 5.0, 5.5, 5.5, 4.0, 5.0,
            4.5, 5.5, 5.0, 4.5, 5.5, 4.0, 4.2, 4.8, 4.8, 4.2,
        ]).unwrap();

        let y = Array1::from_vec(vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ]);

        (x, y)
    }

    #[test]
    fn test_gaussian_naive_bayes() {
        let (x, y) = create_classification_data();

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        assert_eq!(nb.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_gaussian_proba() {
        let (x, y) = create_classification_data();

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let proba = nb.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert!(proba[0] < 0.01);
        assert!(proba[19] > 0.99);
    }

    #[test]
    fn test_class_priors() {
        let (x, y) = create_classification_data();

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let priors = nb.class_priors().unwrap();
        assert!((priors[0] - 0.5).abs() < 1e-12);
        assert!((priors[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unfitted() {
        let (x, _) = create_classification_data();
        let nb = GaussianNaiveBayes::new();
        assert!(matches!(nb.predict(&x), Err(CarrotError::ModelNotFitted)));
    }
}
