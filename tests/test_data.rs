//! Integration test: loading data into a setup

use carrot::data::{load_data, ScalerType, Setup};
use carrot::CarrotError;
use polars::prelude::*;
use std::io::Write;

#[test]
fn test_csv_to_setup() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "a,b,label").unwrap();
    for i in 0..10 {
        writeln!(file, "{},{},{}", i, 10 - i, i % 2).unwrap();
    }
    file.flush().unwrap();

    let df = load_data(file.path()).unwrap();
    assert_eq!(df.shape(), (10, 3));

    let setup = Setup::from_dataframe(&df, "label", ScalerType::MinMax).unwrap();
    assert!(setup.feature_scaling());
    assert_eq!(setup.feature_names(), vec!["a", "b"]);

    let x = setup.features(None).unwrap();
    assert!(x.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_setup_rejects_multiclass_target() {
    let df = df!("a" => [1.0, 2.0, 3.0], "label" => [0i64, 1, 2]).unwrap();
    assert!(Setup::from_dataframe(&df, "label", ScalerType::None).is_err());
}

#[test]
fn test_unsupported_extension() {
    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    assert!(matches!(load_data(file.path()), Err(CarrotError::InvalidInput(_))));
}
