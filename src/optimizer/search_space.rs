//! Search space definition for hyperparameters

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type of parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Continuous float parameter
    Float {
        low: f64,
        high: f64,
        log_scale: bool,
    },
    /// Integer parameter, both bounds inclusive
    Int {
        low: i64,
        high: i64,
        log_scale: bool,
    },
    /// Categorical parameter
    Categorical {
        choices: Vec<String>,
    },
}

/// A single hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParameterType,
}

impl Parameter {
    /// Create a float parameter
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: false,
            },
        }
    }

    /// Create a log-scale float parameter
    pub fn log_float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: true,
            },
        }
    }

    /// Create an integer parameter
    pub fn int(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Int {
                low,
                high,
                log_scale: false,
            },
        }
    }

    /// Create a categorical parameter
    pub fn categorical(name: impl Into<String>, choices: &[&str]) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Categorical {
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        }
    }

    /// Sample a random value
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterValue {
        match &self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                let val = if *log_scale {
                    let log_low = low.ln();
                    let log_high = high.ln();
                    (rng.gen::<f64>() * (log_high - log_low) + log_low).exp()
                } else {
                    rng.gen::<f64>() * (high - low) + low
                };
                ParameterValue::Float(val.clamp(*low, *high))
            }
            ParameterType::Int { low, high, log_scale } => {
                let val = if *log_scale {
                    let log_low = (*low as f64).ln();
                    let log_high = (*high as f64 + 1.0).ln();
                    let v = (rng.gen::<f64>() * (log_high - log_low) + log_low).exp().floor() as i64;
                    v.clamp(*low, *high)
                } else {
                    rng.gen_range(*low..=*high)
                };
                ParameterValue::Int(val)
            }
            ParameterType::Categorical { choices } => {
                let idx = rng.gen_range(0..choices.len());
                ParameterValue::String(choices[idx].clone())
            }
        }
    }

    /// Distance between two values of this parameter, normalized to [0, 1]
    pub fn distance(&self, a: &ParameterValue, b: &ParameterValue) -> f64 {
        let bounds = match &self.param_type {
            ParameterType::Float { low, high, log_scale } => Some((*low, *high, *log_scale)),
            ParameterType::Int { low, high, log_scale } => Some((*low as f64, *high as f64, *log_scale)),
            ParameterType::Categorical { .. } => None,
        };

        match (bounds, a.as_float(), b.as_float()) {
            (Some((low, high, log_scale)), Some(va), Some(vb)) => {
                if log_scale && low > 0.0 {
                    let span = (high.ln() - low.ln()).max(f64::EPSILON);
                    (va.max(low).ln() - vb.max(low).ln()).abs() / span
                } else {
                    (va - vb).abs() / (high - low).max(f64::EPSILON)
                }
            }
            _ => match (a, b) {
                (ParameterValue::String(va), ParameterValue::String(vb)) if va == vb => 0.0,
                _ => 1.0,
            },
        }
    }

    /// Whether a value lies within this parameter's domain
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (&self.param_type, value) {
            (ParameterType::Float { low, high, .. }, ParameterValue::Float(v)) => {
                v.is_finite() && *v >= *low && *v <= *high
            }
            (ParameterType::Int { low, high, .. }, ParameterValue::Int(v)) => *v >= *low && *v <= *high,
            (ParameterType::Categorical { choices }, ParameterValue::String(v)) => choices.contains(v),
            _ => false,
        }
    }
}

/// Sampled parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
    String(String),
}

impl ParameterValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::String(v) => write!(f, "{}", v),
        }
    }
}

/// Parameters of one trial, ordered by name
pub type TrialParams = BTreeMap<String, ParameterValue>;

/// Search space for hyperparameter optimization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Add a parameter to the search space
    pub fn add(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a float parameter
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::float(name, low, high))
    }

    /// Add a log-scale float parameter
    pub fn log_float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::log_float(name, low, high))
    }

    /// Add an integer parameter
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.add(Parameter::int(name, low, high))
    }

    /// Add a categorical parameter
    pub fn categorical(self, name: impl Into<String>, choices: &[&str]) -> Self {
        self.add(Parameter::categorical(name, choices))
    }

    /// Get all parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Sample a random configuration
    pub fn sample(&self, rng: &mut impl Rng) -> TrialParams {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.sample(rng)))
            .collect()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Get parameter names in order
    pub fn param_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_search_space_sampling_stays_in_bounds() {
        let space = SearchSpace::new()
            .log_float("alpha", 1e-5, 1.0)
            .int("max_iter", 100, 2000)
            .categorical("criterion", &["gini", "entropy"]);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..200 {
            let params = space.sample(&mut rng);
            assert_eq!(params.len(), 3);
            for p in space.parameters() {
                assert!(p.contains(&params[&p.name]), "{} out of domain: {}", p.name, params[&p.name]);
            }
        }
    }

    #[test]
    fn test_sampling_is_seeded() {
        let space = SearchSpace::new().float("x", 0.0, 1.0).int("n", 1, 30);
        let a = space.sample(&mut Xoshiro256PlusPlus::seed_from_u64(7));
        let b = space.sample(&mut Xoshiro256PlusPlus::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_parameter_distance() {
        let p = Parameter::log_float("c", 1e-3, 1e3);
        let d = p.distance(&ParameterValue::Float(1e-3), &ParameterValue::Float(1e3));
        assert!((d - 1.0).abs() < 1e-9);

        let cat = Parameter::categorical("weights", &["uniform", "distance"]);
        let same = ParameterValue::String("uniform".into());
        assert_eq!(cat.distance(&same, &same), 0.0);
        assert_eq!(cat.distance(&same, &ParameterValue::String("distance".into())), 1.0);
    }

    #[test]
    fn test_parameter_value_accessors() {
        assert_eq!(ParameterValue::Int(3).as_float(), Some(3.0));
        assert_eq!(ParameterValue::Float(3.5).as_int(), None);
        assert_eq!(ParameterValue::String("gini".into()).as_string(), Some("gini"));
    }
}
