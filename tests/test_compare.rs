//! Integration test: algorithm comparison end-to-end

use carrot::data::{ScalerType, Setup};
use carrot::modelling::{compare_algorithms, Algorithm, CompareConfig, FIT_TIME_COLUMN};
use carrot::training::{CVConfig, Metric, Model};
use carrot::CarrotError;
use polars::prelude::*;
use std::collections::BTreeSet;

fn classification_df() -> DataFrame {
    let label: Vec<i64> = (0..60).map(|i| i % 2).collect();
    let f1: Vec<f64> = (0..60).map(|i| i as f64 * 0.5 + (i % 2) as f64 * 12.0).collect();
    let f2: Vec<f64> = (0..60).map(|i| ((i * 7) % 11) as f64 - (i % 2) as f64 * 3.0).collect();
    df!(
        "f1" => f1,
        "f2" => f2,
        "target" => label
    )
    .unwrap()
}

fn scaled_setup() -> Setup {
    Setup::from_dataframe(&classification_df(), "target", ScalerType::Standard).unwrap()
}

#[test]
fn test_compare_whole_catalogue() {
    let setup = scaled_setup();
    let (table, registry) = compare_algorithms(&setup, &CompareConfig::default()).unwrap();

    assert_eq!(table.algorithms(), Algorithm::all());
    assert_eq!(registry.len(), Algorithm::all().len());
    assert!(registry.iter().all(|(_, model)| model.is_none()));

    for row in table.rows() {
        for metric in Metric::all() {
            let value = row.get(metric);
            assert!((0.0..=1.0).contains(&value), "{} {} = {}", row.algorithm, metric, value);
        }
        assert!(row.fit_time_secs >= 0.0);
    }
}

#[test]
fn test_compare_frame_and_models() {
    let setup = scaled_setup();
    let config = CompareConfig::new()
        .with_include(["lr", "knn"])
        .with_sort(Some("roc_auc"))
        .with_return_models(true);
    let (table, registry) = compare_algorithms(&setup, &config).unwrap();

    let df = table.to_dataframe().unwrap();
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(
        names,
        vec!["algorithm", "accuracy", "precision", "recall", "f1", "roc_auc", FIT_TIME_COLUMN]
    );
    assert_eq!(df.height(), 2);

    let x = setup.features(None).unwrap();
    for algorithm in [Algorithm::LogisticRegression, Algorithm::KNN] {
        let model = registry.get(algorithm).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(&x).unwrap().len(), setup.n_samples());
    }
}

#[test]
fn test_compare_registry_keys_unsorted() {
    let setup = scaled_setup();
    let config = CompareConfig::new().with_include(["lr", "knn"]).with_return_models(true);
    let (table, registry) = compare_algorithms(&setup, &config).unwrap();

    assert_eq!(table.algorithms(), vec![Algorithm::LogisticRegression, Algorithm::KNN]);
    let keys: BTreeSet<Algorithm> = registry.iter().map(|(a, _)| *a).collect();
    assert_eq!(keys, BTreeSet::from([Algorithm::LogisticRegression, Algorithm::KNN]));
    assert!(registry.iter().all(|(_, model)| model.is_some()));
}

#[test]
fn test_compare_metrics_ignore_return_models() {
    let setup = scaled_setup();
    let config = CompareConfig::new().with_include(["lr", "dt", "knn", "rf"]);

    let (without, _) = compare_algorithms(&setup, &config).unwrap();
    let (with, _) = compare_algorithms(&setup, &config.clone().with_return_models(true)).unwrap();

    assert_eq!(without.algorithms(), with.algorithms());
    for (a, b) in without.rows().iter().zip(with.rows()) {
        for metric in Metric::all() {
            assert_eq!(a.get(metric), b.get(metric), "{} {}", a.algorithm, metric);
        }
    }
}

#[test]
fn test_compare_is_deterministic() {
    let setup = scaled_setup();
    let config = CompareConfig::new().with_include(["rf", "extratrees", "perceptron"]);

    let (first, _) = compare_algorithms(&setup, &config).unwrap();
    let (second, _) = compare_algorithms(&setup, &config).unwrap();

    let scores = |t: &carrot::modelling::ComparisonTable| -> Vec<f64> {
        t.rows().iter().flat_map(|r| Metric::all().into_iter().map(move |m| r.get(m))).collect()
    };
    assert_eq!(scores(&first), scores(&second));
}

#[test]
fn test_compare_plain_kfold() {
    let setup = scaled_setup();
    let cv = CVConfig::default().with_stratified(false).with_n_splits(3);
    let config = CompareConfig::new().with_include(["dt"]).with_cv(cv);

    let (table, _) = compare_algorithms(&setup, &config).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn test_compare_rejects_unknown_algorithm() {
    let setup = scaled_setup();
    let config = CompareConfig::new().with_include(["lr", "xgboost"]);
    let err = compare_algorithms(&setup, &config).unwrap_err();

    assert!(matches!(&err, CarrotError::UnknownAlgorithm(id) if id == "xgboost"));
    assert!(err.is_invalid_input());
}

#[test]
fn test_compare_rejects_unknown_sort_metric() {
    let setup = scaled_setup();
    let config = CompareConfig::new().with_include(["dt"]).with_sort(Some("mse"));
    let err = compare_algorithms(&setup, &config).unwrap_err();
    assert!(matches!(err, CarrotError::UnknownMetric(_)));
}
