//! Hyperparameter tuner
//!
//! One study per included algorithm, each maximizing the mean cross-validated
//! score of the chosen metric.

use super::catalogue::{check_feature_scaling, check_include, check_metric, Algorithm};
use super::config::TuneConfig;
use super::factory::{build_model, get_model_instance};
use super::hyperparams::Hyperparams;
use super::results::{TuningRow, TuningTable};
use crate::data::Setup;
use crate::error::{CarrotError, Result};
use crate::optimizer::{Objective, OptimizeDirection, Study, StudyConfig, Trial};
use crate::training::{cross_val_score, CVConfig, Metric, Model, ModelInstance};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

/// User attribute carrying a trial's hyperparameters
pub const HYPERPARAMS_ATTR: &str = "hyperparams";

/// Objective of one algorithm's study: the mean CV score of `metric`
#[derive(Debug, Clone)]
pub struct TuningObjective<'a> {
    pub algorithm: Algorithm,
    pub metric: Metric,
    pub x: &'a Array2<f64>,
    pub y: &'a Array1<f64>,
    pub cv: &'a CVConfig,
}

impl Objective for TuningObjective<'_> {
    fn evaluate(&self, trial: &mut Trial) -> Result<f64> {
        let model = get_model_instance(self.algorithm, Some(trial))?;
        trial.set_user_attr(HYPERPARAMS_ATTR, model.hyperparams().to_json()?);

        let scores = cross_val_score(&model, self.x, self.y, self.metric, self.cv)?;
        debug!(
            algorithm = %self.algorithm,
            trial = trial.number(),
            scores = ?scores.scores,
            "Trial scored"
        );
        Ok(scores.mean_score)
    }
}

/// Tune every included algorithm and rank them by their best score.
///
/// Arguments are validated in this order before any trial runs: algorithm
/// identifiers, metric, feature scaling, trial count, feature names. The
/// returned model list follows the table's row order; entries are `None`
/// unless `return_models` is set.
pub fn tune_hyperparams(setup: &Setup, config: &TuneConfig) -> Result<(TuningTable, Vec<Option<ModelInstance>>)> {
    info!("%%% TUNING HYPERPARAMETERS");

    let algorithms = check_include(Some(&config.include))?;
    let metric = check_metric(&config.optimize)?;
    check_feature_scaling(&algorithms, setup.feature_scaling())?;
    if config.n_trials == 0 {
        return Err(CarrotError::InvalidParameter {
            name: "n_trials".to_string(),
            value: "0".to_string(),
            reason: "at least one trial per algorithm is required".to_string(),
        });
    }
    // an empty feature list selects every feature
    let feature_list = config.feature_list.as_deref().filter(|names| !names.is_empty());
    let x = setup.features(feature_list)?;
    let y = setup.y_clf_train();

    info!("Algorithms selected for tuning: {:?}", config.include);
    info!("Metric to optimize for: {}", metric);
    info!("Trials per algorithm: {}", config.n_trials);

    let mut results: Vec<(TuningRow, Option<ModelInstance>)> = Vec::with_capacity(algorithms.len());

    for algorithm in algorithms {
        let objective = TuningObjective {
            algorithm,
            metric,
            x: &x,
            y,
            cv: &config.cv,
        };
        let study_config = StudyConfig::new()
            .with_direction(OptimizeDirection::Maximize)
            .with_sampler(config.sampler)
            .with_random_state(config.random_state);
        let mut study = Study::new(
            format!("study_{}", algorithm),
            study_config,
            Hyperparams::search_space(algorithm),
        );

        study.optimize(&objective, config.n_trials)?;

        let (value, hyperparams) = best_result(&study, algorithm)?;
        info!(study = study.name(), best_value = value, "Study finished");

        let model = if config.return_models {
            let mut model = build_model(&hyperparams)?;
            model.fit(&x, y)?;
            Some(model)
        } else {
            None
        };

        results.push((
            TuningRow {
                algorithm,
                metric: value,
                hyperparams,
            },
            model,
        ));
    }

    // stable: ties keep include order
    results.sort_by(|a, b| b.0.metric.total_cmp(&a.0.metric));

    let (rows, models): (Vec<TuningRow>, Vec<Option<ModelInstance>>) = results.into_iter().unzip();
    let table = TuningTable::from_rows(rows);

    for row in table.rows() {
        info!(algorithm = %row.algorithm, metric = row.metric, "Tuning result");
    }

    Ok((table, models))
}

/// Best objective value and the hyperparameters recorded with it
fn best_result(study: &Study, algorithm: Algorithm) -> Result<(f64, Hyperparams)> {
    let best = study
        .best_trial()
        .ok_or_else(|| CarrotError::OptimizationError(format!("{} has no finished trials", study.name())))?;
    let recorded = best.user_attr(HYPERPARAMS_ATTR).ok_or_else(|| {
        CarrotError::OptimizationError(format!(
            "{}: trial {} recorded no hyperparameters",
            study.name(),
            best.number
        ))
    })?;

    Ok((best.value, Hyperparams::from_json(algorithm, recorded)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ScalerType;
    use crate::optimizer::SearchSpace;
    use polars::prelude::*;

    fn setup(scaler: ScalerType) -> Setup {
        let a: Vec<f64> = (0..40).map(|i| if i < 20 { i as f64 } else { i as f64 + 10.0 }).collect();
        let b: Vec<f64> = (0..40).map(|i| ((i * 13) % 7) as f64).collect();
        let label: Vec<i64> = (0..40).map(|i| if i < 20 { 0 } else { 1 }).collect();
        let df = df!("a" => a, "b" => b, "label" => label).unwrap();
        Setup::from_dataframe(&df, "label", scaler).unwrap()
    }

    #[test]
    fn test_objective_records_hyperparams() {
        let setup = setup(ScalerType::Standard);
        let x = setup.features(None).unwrap();
        let cv = CVConfig::default();
        let objective = TuningObjective {
            algorithm: Algorithm::NaiveBayes,
            metric: Metric::Accuracy,
            x: &x,
            y: setup.y_clf_train(),
            cv: &cv,
        };

        let mut rng = rand::thread_rng();
        let space: SearchSpace = Hyperparams::search_space(Algorithm::NaiveBayes);
        let mut trial = Trial::new(0, space.sample(&mut rng));
        let value = objective.evaluate(&mut trial).unwrap();

        assert!((0.0..=1.0).contains(&value));
        assert!(trial.user_attrs()[HYPERPARAMS_ATTR].get("var_smoothing").is_some());
    }

    #[test]
    fn test_tune_is_reproducible() {
        let setup = setup(ScalerType::Standard);
        let config = TuneConfig::new(["dt", "nb"], "accuracy").with_n_trials(3);

        let (first, models) = tune_hyperparams(&setup, &config).unwrap();
        let (second, _) = tune_hyperparams(&setup, &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(models.iter().all(|m| m.is_none()));
        assert!(first.rows().windows(2).all(|w| w[0].metric >= w[1].metric));
    }

    #[test]
    fn test_feature_list_and_return_models() {
        let setup = setup(ScalerType::Standard);
        let config = TuneConfig::new(["rf", "knn"], "roc_auc")
            .with_n_trials(2)
            .with_feature_list(["a"])
            .with_return_models(true);

        let (table, models) = tune_hyperparams(&setup, &config).unwrap();
        assert_eq!(models.len(), 2);
        for (row, model) in table.rows().iter().zip(models.iter()) {
            let model = model.as_ref().unwrap();
            assert_eq!(model.algorithm(), row.algorithm);
            assert_eq!(model.hyperparams(), row.hyperparams);
            // refit on the same single column the study scored on
            assert!(model.predict(&setup.features(Some(&["a".to_string()])).unwrap()).is_ok());
        }
    }

    #[test]
    fn test_validation_order() {
        let unscaled = setup(ScalerType::None);

        let err = tune_hyperparams(&unscaled, &TuneConfig::new(["knn", "nope"], "bogus")).unwrap_err();
        assert!(matches!(err, CarrotError::UnknownAlgorithm(_)));

        let err = tune_hyperparams(&unscaled, &TuneConfig::new(["knn"], "bogus")).unwrap_err();
        assert!(matches!(err, CarrotError::UnknownMetric(_)));

        let err = tune_hyperparams(&unscaled, &TuneConfig::new(["dt", "knn"], "f1")).unwrap_err();
        assert!(matches!(err, CarrotError::FeatureScaling { algorithm } if algorithm == "knn"));

        let err = tune_hyperparams(&unscaled, &TuneConfig::new(["dt"], "f1").with_n_trials(0)).unwrap_err();
        assert!(matches!(err, CarrotError::InvalidParameter { .. }));

        let config = TuneConfig::new(["dt"], "f1").with_feature_list(["missing"]);
        let err = tune_hyperparams(&unscaled, &config).unwrap_err();
        assert!(matches!(err, CarrotError::FeatureNotFound(_)));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_empty_feature_list_uses_all_features() {
        let setup = setup(ScalerType::Standard);
        let all = TuneConfig::new(["dt", "nb"], "f1").with_n_trials(2);
        let empty = all.clone().with_feature_list(Vec::<String>::new());

        let (expected, _) = tune_hyperparams(&setup, &all).unwrap();
        let (table, _) = tune_hyperparams(&setup, &empty).unwrap();
        assert_eq!(table, expected);
    }
}
