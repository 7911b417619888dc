//! Algorithm comparator

use super::catalogue::{check_include, check_metric};
use super::config::CompareConfig;
use super::results::{ComparisonTable, ModelRegistry};
use super::train::train_model;
use crate::data::Setup;
use crate::error::Result;
use tracing::info;

/// Cross-validate every included algorithm and collect one row each.
///
/// Identifiers and the sort metric are validated before any training. An
/// error from any single algorithm aborts the whole comparison.
pub fn compare_algorithms(setup: &Setup, config: &CompareConfig) -> Result<(ComparisonTable, ModelRegistry)> {
    let algorithms = check_include(config.include.as_deref())?;
    let sort = config.sort.as_deref().map(check_metric).transpose()?;

    info!(
        algorithms = ?algorithms.iter().map(|a| a.id()).collect::<Vec<_>>(),
        "Comparing algorithms"
    );

    let mut table = ComparisonTable::new();
    let mut registry = ModelRegistry::new();

    for algorithm in algorithms {
        let (model, row) = train_model(algorithm, setup, config.return_models, &config.cv)?;
        table.push(row);
        registry.insert(algorithm, model);
    }

    if let Some(metric) = sort {
        table.sort_by_metric(metric);
    }

    for row in table.rows() {
        info!(
            algorithm = %row.algorithm,
            accuracy = row.accuracy,
            f1 = row.f1,
            roc_auc = row.roc_auc,
            "Comparison result"
        );
    }

    Ok((table, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ScalerType;
    use crate::error::CarrotError;
    use crate::modelling::Algorithm;
    use polars::prelude::*;

    fn setup(scaler: ScalerType) -> Setup {
        let a: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { i as f64 } else { i as f64 + 40.0 }).collect();
        let label: Vec<i64> = (0..30).map(|i| i % 2).collect();
        let df = df!("a" => a, "label" => label).unwrap();
        Setup::from_dataframe(&df, "label", scaler).unwrap()
    }

    #[test]
    fn test_rows_follow_include_order() {
        let config = CompareConfig::new().with_include(["nb", "dt", "nb"]);
        let (table, registry) = compare_algorithms(&setup(ScalerType::None), &config).unwrap();

        assert_eq!(
            table.algorithms(),
            vec![Algorithm::NaiveBayes, Algorithm::DecisionTree, Algorithm::NaiveBayes]
        );
        assert_eq!(registry.len(), 2);
        assert!(registry.get(Algorithm::NaiveBayes).is_none());
    }

    #[test]
    fn test_sorted_and_returned_models() {
        let config = CompareConfig::new()
            .with_include(["lr", "dt"])
            .with_sort(Some("f1"))
            .with_return_models(true);
        let (table, registry) = compare_algorithms(&setup(ScalerType::Standard), &config).unwrap();

        let rows = table.rows();
        assert!(rows.windows(2).all(|w| w[0].f1 >= w[1].f1));
        assert!(registry.get(Algorithm::LogisticRegression).is_some());
        assert!(registry.get(Algorithm::DecisionTree).is_some());
    }

    #[test]
    fn test_invalid_arguments_fail_before_training() {
        let setup = setup(ScalerType::None);

        let config = CompareConfig::new().with_include(["dt", "catboost"]);
        let err = compare_algorithms(&setup, &config).unwrap_err();
        assert!(matches!(&err, CarrotError::UnknownAlgorithm(id) if id == "catboost"));

        let config = CompareConfig::new().with_include(["dt"]).with_sort(Some("algorithm"));
        let err = compare_algorithms(&setup, &config).unwrap_err();
        assert!(matches!(&err, CarrotError::UnknownMetric(m) if m == "algorithm"));
        assert!(err.is_invalid_input());
    }
}
