//! Integration test: hyperparameter tuning end-to-end

use carrot::data::{ScalerType, Setup};
use carrot::modelling::{tune_hyperparams, Algorithm, Hyperparams, TuneConfig};
use carrot::optimizer::SamplerType;
use carrot::training::Model;
use carrot::CarrotError;
use polars::prelude::*;

fn num_col_df() -> DataFrame {
    let num_col: Vec<i64> = (0..100).collect();
    let target: Vec<i64> = (0..100).map(|i| if i < 50 { 0 } else { 1 }).collect();
    df!(
        "num_col" => num_col,
        "target" => target
    )
    .unwrap()
}

fn setup(scaler: ScalerType) -> Setup {
    Setup::from_dataframe(&num_col_df(), "target", scaler).unwrap()
}

#[test]
fn test_tune_returns_table_and_models() {
    let setup = setup(ScalerType::Standard);
    let config = TuneConfig::new(["lr"], "f1").with_n_trials(2).with_return_models(true);

    let (table, models) = tune_hyperparams(&setup, &config).unwrap();

    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.algorithm, Algorithm::LogisticRegression);
    assert!((0.0..=1.0).contains(&row.metric));
    assert!(matches!(row.hyperparams, Hyperparams::LogisticRegression(_)));

    assert_eq!(models.len(), 1);
    let model = models[0].as_ref().unwrap();
    assert!(model.is_fitted());
    assert_eq!(model.algorithm(), Algorithm::LogisticRegression);
}

#[test]
fn test_tune_without_models() {
    let setup = setup(ScalerType::Standard);
    let config = TuneConfig::new(["lr", "dt"], "accuracy").with_n_trials(2);

    let (table, models) = tune_hyperparams(&setup, &config).unwrap();
    assert!(models.iter().all(|m| m.is_none()));
    assert_eq!(table.len(), 2);
    assert!(table.rows()[0].metric >= table.rows()[1].metric);
}

#[test]
fn test_tune_results_ignore_return_models() {
    let setup = setup(ScalerType::Standard);
    let config = TuneConfig::new(["lr", "dt", "nb"], "f1").with_n_trials(3);

    let (without, _) = tune_hyperparams(&setup, &config).unwrap();
    let (with, models) = tune_hyperparams(&setup, &config.clone().with_return_models(true)).unwrap();

    assert_eq!(without, with);
    assert!(models.iter().all(|m| m.is_some()));
}

#[test]
fn test_tune_empty_feature_list_means_all_features() {
    let setup = setup(ScalerType::Standard);
    let config = TuneConfig::new(["lr"], "f1")
        .with_n_trials(2)
        .with_feature_list(Vec::<String>::new())
        .with_return_models(true);

    let (table, models) = tune_hyperparams(&setup, &config).unwrap();
    assert_eq!(table.len(), 1);
    let x = setup.features(None).unwrap();
    assert_eq!(models[0].as_ref().unwrap().predict(&x).unwrap().len(), setup.n_samples());
}

#[test]
fn test_tune_is_reproducible_with_random_sampler() {
    let setup = setup(ScalerType::MinMax);
    let config = TuneConfig::new(["knn", "nb"], "roc_auc")
        .with_n_trials(4)
        .with_sampler(SamplerType::Random)
        .with_random_state(Some(7));

    let (first, _) = tune_hyperparams(&setup, &config).unwrap();
    let (second, _) = tune_hyperparams(&setup, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_tune_frame_columns() {
    let setup = setup(ScalerType::None);
    let config = TuneConfig::new(["dt"], "precision").with_n_trials(2);

    let (table, _) = tune_hyperparams(&setup, &config).unwrap();
    let df = table.to_dataframe().unwrap();
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(names, vec!["algorithm", "metric", "hyperparams"]);
}

#[test]
fn test_tune_requires_scaling_for_lr() {
    let setup = setup(ScalerType::None);
    let config = TuneConfig::new(["lr"], "f1").with_n_trials(2);

    let err = tune_hyperparams(&setup, &config).unwrap_err();
    assert!(matches!(&err, CarrotError::FeatureScaling { algorithm } if algorithm == "lr"));
    assert!(err.is_invalid_input());
}

#[test]
fn test_tune_rejects_unknown_metric() {
    let setup = setup(ScalerType::Standard);
    let err = tune_hyperparams(&setup, &TuneConfig::new(["lr"], "log_loss")).unwrap_err();
    assert!(matches!(err, CarrotError::UnknownMetric(_)));
}
