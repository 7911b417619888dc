//! Model factory: catalogue identifier (plus optional trial) to model instance

use super::catalogue::Algorithm;
use super::hyperparams::*;
use crate::error::Result;
use crate::optimizer::Trial;
use crate::training::{
    DecisionTreeClassifier, ExtraTreesClassifier, GaussianNaiveBayes, KNNClassifier, KNNConfig, LogisticRegression,
    ModelInstance, PassiveAggressiveClassifier, Perceptron, RandomForestClassifier, RidgeClassifier, SVMClassifier,
    SVMConfig,
};

/// Unfitted model for `algorithm`.
///
/// Without a trial the model carries its defaults; with one, every
/// hyperparameter of the algorithm is read from the trial's sample.
pub fn get_model_instance(algorithm: Algorithm, trial: Option<&Trial>) -> Result<ModelInstance> {
    let params = match trial {
        Some(trial) => Hyperparams::from_trial(algorithm, trial)?,
        None => Hyperparams::default_for(algorithm),
    };
    build_model(&params)
}

/// Unfitted model from an explicit hyperparameter set
pub fn build_model(params: &Hyperparams) -> Result<ModelInstance> {
    params.validate()?;

    let model = match params {
        Hyperparams::LogisticRegression(p) => ModelInstance::LogisticRegression(
            LogisticRegression::new()
                .with_alpha(p.alpha)
                .with_learning_rate(p.learning_rate)
                .with_max_iter(p.max_iter),
        ),
        Hyperparams::DecisionTree(p) => ModelInstance::DecisionTree(
            DecisionTreeClassifier::new()
                .with_max_depth(p.max_depth)
                .with_min_samples_split(p.min_samples_split)
                .with_min_samples_leaf(p.min_samples_leaf)
                .with_criterion(p.criterion),
        ),
        Hyperparams::ExtraTree(p) => ModelInstance::ExtraTree(
            DecisionTreeClassifier::new_extra()
                .with_max_depth(p.max_depth)
                .with_min_samples_split(p.min_samples_split)
                .with_min_samples_leaf(p.min_samples_leaf),
        ),
        Hyperparams::ExtraTrees(p) => ModelInstance::ExtraTrees(
            ExtraTreesClassifier::new(p.n_estimators)
                .with_max_depth(p.max_depth)
                .with_min_samples_leaf(p.min_samples_leaf),
        ),
        Hyperparams::RandomForest(p) => ModelInstance::RandomForest(
            RandomForestClassifier::new(p.n_estimators)
                .with_max_depth(p.max_depth)
                .with_min_samples_leaf(p.min_samples_leaf)
                .with_max_features(p.max_features),
        ),
        Hyperparams::Ridge(p) => ModelInstance::Ridge(RidgeClassifier::new(p.alpha)),
        Hyperparams::Perceptron(p) => ModelInstance::Perceptron(
            Perceptron::new()
                .with_alpha(p.alpha)
                .with_eta0(p.eta0)
                .with_max_iter(p.max_iter),
        ),
        Hyperparams::PassiveAggressive(p) => ModelInstance::PassiveAggressive(
            PassiveAggressiveClassifier::new().with_c(p.c).with_max_iter(p.max_iter),
        ),
        Hyperparams::KNN(p) => ModelInstance::KNN(KNNClassifier::new(KNNConfig {
            n_neighbors: p.n_neighbors,
            metric: p.metric,
            weights: p.weights,
        })),
        Hyperparams::NaiveBayes(p) => {
            ModelInstance::NaiveBayes(GaussianNaiveBayes::new().with_var_smoothing(p.var_smoothing))
        }
        Hyperparams::LinearSVC(p) => ModelInstance::LinearSVC(SVMClassifier::new(SVMConfig::linear(p.c))),
        Hyperparams::RbfSVC(p) => ModelInstance::RbfSVC(SVMClassifier::new(SVMConfig::rbf(p.c, p.gamma))),
    };

    Ok(model)
}

impl ModelInstance {
    /// The hyperparameters this instance was built with
    pub fn hyperparams(&self) -> Hyperparams {
        match self {
            ModelInstance::LogisticRegression(m) => Hyperparams::LogisticRegression(LogisticRegressionParams {
                alpha: m.alpha,
                learning_rate: m.learning_rate,
                max_iter: m.max_iter,
            }),
            ModelInstance::DecisionTree(m) => Hyperparams::DecisionTree(DecisionTreeParams {
                max_depth: m.max_depth,
                min_samples_split: m.min_samples_split,
                min_samples_leaf: m.min_samples_leaf,
                criterion: m.criterion,
            }),
            ModelInstance::ExtraTree(m) => Hyperparams::ExtraTree(ExtraTreeParams {
                max_depth: m.max_depth,
                min_samples_split: m.min_samples_split,
                min_samples_leaf: m.min_samples_leaf,
            }),
            ModelInstance::ExtraTrees(m) => Hyperparams::ExtraTrees(ExtraTreesParams {
                n_estimators: m.n_estimators,
                max_depth: m.max_depth,
                min_samples_leaf: m.min_samples_leaf,
            }),
            ModelInstance::RandomForest(m) => Hyperparams::RandomForest(RandomForestParams {
                n_estimators: m.n_estimators,
                max_depth: m.max_depth,
                min_samples_leaf: m.min_samples_leaf,
                max_features: m.max_features,
            }),
            ModelInstance::Ridge(m) => Hyperparams::Ridge(RidgeParams { alpha: m.alpha }),
            ModelInstance::Perceptron(m) => Hyperparams::Perceptron(PerceptronParams {
                alpha: m.alpha,
                eta0: m.eta0,
                max_iter: m.max_iter,
            }),
            ModelInstance::PassiveAggressive(m) => Hyperparams::PassiveAggressive(PassiveAggressiveParams {
                c: m.c,
                max_iter: m.max_iter,
            }),
            ModelInstance::KNN(m) => Hyperparams::KNN(KNNParams {
                n_neighbors: m.config.n_neighbors,
                weights: m.config.weights,
                metric: m.config.metric,
            }),
            ModelInstance::NaiveBayes(m) => Hyperparams::NaiveBayes(NaiveBayesParams {
                var_smoothing: m.var_smoothing,
            }),
            ModelInstance::LinearSVC(m) => Hyperparams::LinearSVC(LinearSVCParams { c: m.config.c }),
            ModelInstance::RbfSVC(m) => Hyperparams::RbfSVC(RbfSVCParams {
                c: m.config.c,
                gamma: match m.config.kernel {
                    crate::training::KernelType::RBF { gamma } => gamma,
                    crate::training::KernelType::Linear => None,
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::Model;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_instances() {
        for algorithm in Algorithm::all() {
            let model = get_model_instance(algorithm, None).unwrap();
            assert_eq!(model.algorithm(), algorithm);
            assert!(!model.is_fitted());
            assert_eq!(model.hyperparams(), Hyperparams::default_for(algorithm));
        }
    }

    #[test]
    fn test_trial_instances_carry_trial_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for algorithm in Algorithm::all() {
            let trial = Trial::new(0, Hyperparams::search_space(algorithm).sample(&mut rng));
            let model = get_model_instance(algorithm, Some(&trial)).unwrap();
            assert_eq!(model.hyperparams(), Hyperparams::from_trial(algorithm, &trial).unwrap());
        }
    }

    #[test]
    fn test_build_model_validates() {
        let params = Hyperparams::KNN(KNNParams {
            n_neighbors: 0,
            ..Default::default()
        });
        assert!(build_model(&params).is_err());
    }
}
