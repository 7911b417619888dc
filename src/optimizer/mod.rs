//! Hyperparameter search engine
//!
//! Provides:
//! - Search spaces over float, integer and categorical parameters
//! - Random and Tree-structured Parzen Estimator (TPE) samplers
//! - Studies that run a fixed number of trials against an [`Objective`]

mod config;
mod samplers;
mod search_space;
mod study;

pub use config::{OptimizeDirection, StudyConfig};
pub use samplers::{create_sampler, RandomSampler, Sampler, SamplerType, TPESampler};
pub use search_space::{Parameter, ParameterType, ParameterValue, SearchSpace, TrialParams};
pub use study::{FrozenTrial, Objective, Study, Trial};
