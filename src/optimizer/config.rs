//! Study configuration

use super::SamplerType;
use serde::{Deserialize, Serialize};

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizeDirection {
    Minimize,
    Maximize,
}

impl OptimizeDirection {
    /// Map an objective value to a loss where lower is better
    pub fn to_loss(self, value: f64) -> f64 {
        match self {
            OptimizeDirection::Minimize => value,
            OptimizeDirection::Maximize => -value,
        }
    }

    /// Whether `candidate` strictly improves on `incumbent`
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            OptimizeDirection::Minimize => candidate < incumbent,
            OptimizeDirection::Maximize => candidate > incumbent,
        }
    }
}

/// Configuration for a study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Optimization direction
    pub direction: OptimizeDirection,

    /// Sampler type
    pub sampler: SamplerType,

    /// Number of initial random samples before the TPE model kicks in
    pub n_startup_trials: usize,

    /// Random seed, `None` draws one from the OS
    pub random_state: Option<u64>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            direction: OptimizeDirection::Maximize,
            sampler: SamplerType::TPE,
            n_startup_trials: 10,
            random_state: Some(42),
        }
    }
}

impl StudyConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set direction
    pub fn with_direction(mut self, direction: OptimizeDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Builder method to set sampler
    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder method to set the number of startup trials
    pub fn with_n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.direction, OptimizeDirection::Maximize);
        assert_eq!(config.sampler, SamplerType::TPE);
        assert_eq!(config.random_state, Some(42));
    }

    #[test]
    fn test_builder() {
        let config = StudyConfig::new()
            .with_direction(OptimizeDirection::Minimize)
            .with_sampler(SamplerType::Random)
            .with_random_state(None);

        assert_eq!(config.direction, OptimizeDirection::Minimize);
        assert_eq!(config.sampler, SamplerType::Random);
        assert!(config.random_state.is_none());
    }

    #[test]
    fn test_direction_loss() {
        assert_eq!(OptimizeDirection::Maximize.to_loss(0.8), -0.8);
        assert!(OptimizeDirection::Maximize.is_better(0.9, 0.8));
        assert!(!OptimizeDirection::Minimize.is_better(0.9, 0.8));
        assert!(!OptimizeDirection::Maximize.is_better(0.8, 0.8));
    }
}
