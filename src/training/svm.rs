//! Support Vector Classifier trained with SMO (Sequential Minimal Optimization)

use super::models::{check_binary_target, check_features, threshold, Model};
use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²).
    /// `None` uses `1 / (n_features * Var(X))`.
    RBF { gamma: Option<f64> },
}

impl KernelType {
    fn eval(self, gamma: f64, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            KernelType::Linear => a.dot(&b),
            KernelType::RBF { .. } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).powi(2)).sum();
                (-gamma * norm_sq).exp()
            }
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    pub kernel: KernelType,
    /// Tolerance for the KKT check
    pub tol: f64,
    /// Maximum number of passes over the data
    pub max_iter: usize,
    pub random_state: Option<u64>,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::RBF { gamma: None },
            tol: 1e-3,
            max_iter: 1000,
            random_state: Some(42),
        }
    }
}

impl SVMConfig {
    pub fn linear(c: f64) -> Self {
        Self {
            c,
            kernel: KernelType::Linear,
            ..Default::default()
        }
    }

    pub fn rbf(c: f64, gamma: Option<f64>) -> Self {
        Self {
            c,
            kernel: KernelType::RBF { gamma },
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SupportVectors {
    vectors: Array2<f64>,
    /// alpha_i * y_i per support vector
    dual_coef: Array1<f64>,
    bias: f64,
    gamma: f64,
}

/// Binary support vector classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    pub config: SVMConfig,
    fitted: Option<SupportVectors>,
}

impl SVMClassifier {
    pub fn new(config: SVMConfig) -> Self {
        Self { config, fitted: None }
    }

    pub fn n_support(&self) -> usize {
        self.fitted.as_ref().map_or(0, |sv| sv.vectors.nrows())
    }

    fn resolve_gamma(&self, x: &Array2<f64>) -> Result<f64> {
        let gamma = match self.config.kernel {
            KernelType::Linear => return Ok(0.0),
            KernelType::RBF { gamma: Some(g) } => g,
            KernelType::RBF { gamma: None } => {
                let var = x.var(0.0);
                if var > 0.0 { 1.0 / (x.ncols() as f64 * var) } else { 1.0 }
            }
        };
        if gamma <= 0.0 || !gamma.is_finite() {
            return Err(CarrotError::InvalidParameter {
                name: "gamma".to_string(),
                value: gamma.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(gamma)
    }

    /// Compute kernel matrix, rows in parallel
    fn kernel_matrix(&self, x: &Array2<f64>, gamma: f64) -> Array2<f64> {
        let n = x.nrows();
        let kernel = self.config.kernel;
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (0..n).map(|j| kernel.eval(gamma, x.row(i), x.row(j))).collect())
            .collect();

        Array2::from_shape_fn((n, n), |(i, j)| rows[i][j])
    }

    /// Simplified SMO with random second-index selection
    fn smo_train(&self, x: &Array2<f64>, y: &[f64], gamma: f64) -> (Array1<f64>, f64) {
        let n = x.nrows();
        let c = self.config.c;
        let tol = self.config.tol;
        let k = self.kernel_matrix(x, gamma);

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let output = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            let mut sum = bias;
            for i in 0..n {
                if alphas[i] != 0.0 {
                    sum += alphas[i] * y[i] * k[[i, idx]];
                }
            }
            sum
        };

        let max_passes = 5;
        let mut passes = 0;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.config.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = output(&alphas, bias, i) - y[i];
                if !((y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = output(&alphas, bias, j) - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                alphas[j] = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(l, h);
                if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                alphas[i] = alpha_i_old + y[i] * y[j] * (alpha_j_old - alphas[j]);

                let b1 = bias - e_i
                    - y[i] * (alphas[i] - alpha_i_old) * k[[i, i]]
                    - y[j] * (alphas[j] - alpha_j_old) * k[[i, j]];
                let b2 = bias - e_j
                    - y[i] * (alphas[i] - alpha_i_old) * k[[i, j]]
                    - y[j] * (alphas[j] - alpha_j_old) * k[[j, j]];

                bias = if alphas[i] > 0.0 && alphas[i] < c {
                    b1
                } else if alphas[j] > 0.0 && alphas[j] < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };
                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        (alphas, bias)
    }
}

impl Model for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_binary_target(x, y)?;
        if self.config.c <= 0.0 {
            return Err(CarrotError::InvalidParameter {
                name: "c".to_string(),
                value: self.config.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let n = x.nrows();
        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(CarrotError::InvalidInput(format!(
                "Dataset has {} samples, exceeding the maximum {} for the SVM kernel matrix",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let gamma = self.resolve_gamma(x)?;
        let y_signed: Vec<f64> = y.iter().map(|&v| if v > 0.5 { 1.0 } else { -1.0 }).collect();
        let (alphas, bias) = self.smo_train(x, &y_signed, gamma);

        let support: Vec<usize> = (0..n).filter(|&i| alphas[i] > 1e-8).collect();
        let vectors = x.select(ndarray::Axis(0), &support);
        let dual_coef = Array1::from_iter(support.iter().map(|&i| alphas[i] * y_signed[i]));

        if !bias.is_finite() || dual_coef.iter().any(|v| !v.is_finite()) {
            return Err(CarrotError::TrainingError("SMO produced non-finite coefficients".to_string()));
        }

        self.fitted = Some(SupportVectors {
            vectors,
            dual_coef,
            bias,
            gamma,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(threshold(&self.decision_function(x)?, 0.0))
    }

    /// Signed distance to the separating surface
    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let sv = self.fitted.as_ref().ok_or(CarrotError::ModelNotFitted)?;
        check_features(x, sv.vectors.ncols())?;
        let kernel = self.config.kernel;

        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                sv.vectors
                    .rows()
                    .into_iter()
                    .zip(sv.dual_coef.iter())
                    .map(|(v, &coef)| coef * kernel.eval(sv.gamma, row, v))
                    .sum::<f64>()
                    + sv.bias
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
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
    fn test_linear_svc() {
        let (x, y) = separable();
        let mut svc = SVMClassifier::new(SVMConfig::linear(1.0));
        svc.fit(&x, &y).unwrap();

        assert_eq!(svc.predict(&x).unwrap(), y);
        assert!(svc.n_support() > 0);
    }

    #[test]
    fn test_rbf_svc() {
        let (x, y) = separable();
        let mut svc = SVMClassifier::new(SVMConfig::rbf(10.0, Some(0.5)));
        svc.fit(&x, &y).unwrap();

        let scores = svc.decision_function(&x).unwrap();
        assert!(scores[0] < 0.0);
        assert!(scores[5] > 0.0);
    }

    #[test]
    fn test_invalid_c() {
        let (x, y) = separable();
        let mut svc = SVMClassifier::new(SVMConfig::linear(0.0));
        assert!(matches!(svc.fit(&x, &y), Err(CarrotError::InvalidParameter { .. })));
    }

    #[test]
    fn test_unfitted() {
        let (x, _) = separable();
        let svc = SVMClassifier::new(SVMConfig::default());
        assert!(matches!(svc.decision_function(&x), Err(CarrotError::ModelNotFitted)));
    }
}
