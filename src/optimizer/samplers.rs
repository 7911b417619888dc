//! Sampling strategies for hyperparameter optimization

use super::search_space::{SearchSpace, TrialParams};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Type of sampler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplerType {
    /// Random sampling
    Random,
    /// Tree-structured Parzen Estimator
    #[default]
    TPE,
}

/// Trait for hyperparameter samplers
///
/// `history` holds the parameters of every finished trial together with its
/// loss. Lower losses are better regardless of the study direction.
pub trait Sampler: Send + Sync {
    /// Sample the next set of hyperparameters
    fn sample(&mut self, search_space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams;
}

fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
        None => Xoshiro256PlusPlus::from_entropy(),
    }
}

/// Random sampler
#[derive(Debug)]
pub struct RandomSampler {
    rng: Xoshiro256PlusPlus,
}

impl RandomSampler {
    /// Create a new random sampler
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded_rng(seed) }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, search_space: &SearchSpace, _history: &[(TrialParams, f64)]) -> TrialParams {
        search_space.sample(&mut self.rng)
    }
}

/// Tree-structured Parzen Estimator sampler
///
/// Simplified: after the startup phase, draws `n_candidates` random
/// configurations and keeps the one closest to the best `gamma` quantile of
/// the history.
#[derive(Debug)]
pub struct TPESampler {
    rng: Xoshiro256PlusPlus,
    n_startup_trials: usize,
    gamma: f64,
    n_candidates: usize,
}

impl TPESampler {
    /// Create a new TPE sampler
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
            n_startup_trials: 10,
            gamma: 0.25,
            n_candidates: 24,
        }
    }

    /// Set number of startup trials
    pub fn with_n_startup(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Set gamma (quantile for splitting good/bad)
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(f64::EPSILON, 1.0);
        self
    }

    fn similarity(search_space: &SearchSpace, candidate: &TrialParams, good_trials: &[&TrialParams]) -> f64 {
        if good_trials.is_empty() {
            return 0.0;
        }

        let mut total_sim = 0.0;
        for good in good_trials {
            let mut dist = 0.0;
            let mut count = 0;

            for param in search_space.parameters() {
                if let (Some(a), Some(b)) = (candidate.get(&param.name), good.get(&param.name)) {
                    let d = param.distance(a, b);
                    dist += d * d;
                    count += 1;
                }
            }

            if count > 0 {
                dist = (dist / count as f64).sqrt();
                total_sim += 1.0 / (1.0 + dist);
            }
        }

        total_sim / good_trials.len() as f64
    }
}

impl Sampler for TPESampler {
    fn sample(&mut self, search_space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams {
        if history.len() < self.n_startup_trials {
            return search_space.sample(&mut self.rng);
        }

        let mut sorted: Vec<&(TrialParams, f64)> = history.iter().collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

        let n_good = ((sorted.len() as f64 * self.gamma).ceil() as usize).max(1);
        let good_trials: Vec<&TrialParams> = sorted[..n_good].iter().map(|(p, _)| p).collect();

        let mut best_params = search_space.sample(&mut self.rng);
        let mut best_score = Self::similarity(search_space, &best_params, &good_trials);

        for _ in 0..self.n_candidates {
            let candidate = search_space.sample(&mut self.rng);
            let score = Self::similarity(search_space, &candidate, &good_trials);
            if score > best_score {
                best_score = score;
                best_params = candidate;
            }
        }

        best_params
    }
}

/// Create a sampler from type
pub fn create_sampler(sampler_type: SamplerType, seed: Option<u64>, n_startup_trials: usize) -> Box<dyn Sampler> {
    match sampler_type {
        SamplerType::Random => Box::new(RandomSampler::new(seed)),
        SamplerType::TPE => Box::new(TPESampler::new(seed).with_n_startup(n_startup_trials)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::search_space::ParameterValue;

    #[test]
    fn test_random_sampler() {
        let space = SearchSpace::new().float("lr", 0.001, 0.1).int("n", 10, 100);

        let mut sampler = RandomSampler::new(Some(42));
        let params = sampler.sample(&space, &[]);

        assert!(params.contains_key("lr"));
        assert!(params.contains_key("n"));
    }

    #[test]
    fn test_tpe_sampler_startup_is_random() {
        let space = SearchSpace::new().float("lr", 0.001, 0.1);

        let mut tpe = TPESampler::new(Some(42));
        let mut random = RandomSampler::new(Some(42));

        for _ in 0..5 {
            assert_eq!(tpe.sample(&space, &[]), random.sample(&space, &[]));
        }
    }

    #[test]
    fn test_tpe_sampler_prefers_low_loss_region() {
        let space = SearchSpace::new().float("x", 0.0, 1.0);

        // Loss grows with x, so the good region is near zero
        let history: Vec<(TrialParams, f64)> = (0..20)
            .map(|i| {
                let x = i as f64 / 19.0;
                let mut params = TrialParams::new();
                params.insert("x".to_string(), ParameterValue::Float(x));
                (params, x)
            })
            .collect();

        let mut sampler = TPESampler::new(Some(42)).with_n_startup(5);
        let mean: f64 = (0..20)
            .map(|_| sampler.sample(&space, &history)["x"].as_float().unwrap_or(1.0))
            .sum::<f64>()
            / 20.0;

        assert!(mean < 0.5, "mean sample {} should lean toward the good region", mean);
    }

    #[test]
    fn test_create_sampler() {
        let space = SearchSpace::new().categorical("c", &["a", "b"]);
        let mut sampler = create_sampler(SamplerType::Random, Some(1), 10);
        let params = sampler.sample(&space, &[]);
        assert!(params["c"].as_string().is_some());
    }
}
