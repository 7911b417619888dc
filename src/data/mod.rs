//! Prepared datasets
//!
//! A [`Setup`] is the dataset handle every run works from: numeric training
//! features, binary labels and whether the features were scaled.

mod loader;
mod scaler;

pub use loader::{load_data, FileFormat};
pub use scaler::{Scaler, ScalerType};

use crate::error::{CarrotError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::info;

/// Training split prepared for comparison and tuning
#[derive(Debug, Clone)]
pub struct Setup {
    x_train: DataFrame,
    y_clf_train: Array1<f64>,
    feature_scaling: bool,
}

impl Setup {
    /// Build a setup from already prepared parts.
    ///
    /// Every feature column is cast to `Float64`; columns that cannot be cast
    /// or contain missing values are rejected, as are label vectors that are
    /// not exactly 0/1 with both classes present.
    pub fn new(x_train: DataFrame, y_clf_train: Array1<f64>, feature_scaling: bool) -> Result<Self> {
        if x_train.width() == 0 {
            return Err(CarrotError::DataError("No feature columns".to_string()));
        }
        if x_train.height() != y_clf_train.len() {
            return Err(CarrotError::ShapeError {
                expected: format!("{} labels", x_train.height()),
                actual: format!("{} labels", y_clf_train.len()),
            });
        }
        if x_train.height() < 2 {
            return Err(CarrotError::DataError("At least two training rows are required".to_string()));
        }
        check_labels(&y_clf_train)?;

        Ok(Self {
            x_train: numeric_frame(&x_train)?,
            y_clf_train,
            feature_scaling,
        })
    }

    /// Split `target` off `df` and optionally scale the remaining features
    pub fn from_dataframe(df: &DataFrame, target: &str, scaler: ScalerType) -> Result<Self> {
        let labels = df
            .column(target)
            .map_err(|_| CarrotError::FeatureNotFound(target.to_string()))?
            .cast(&DataType::Float64)?;
        if labels.null_count() > 0 {
            return Err(CarrotError::DataError(format!(
                "Target '{}' has missing or non-numeric values",
                target
            )));
        }
        let y = Array1::from_iter(labels.f64()?.into_no_null_iter());

        let features = numeric_frame(&df.drop(target)?)?;
        let x = match scaler {
            ScalerType::None => features,
            scaler_type => {
                let names: Vec<String> = features.get_column_names().iter().map(|s| s.to_string()).collect();
                let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                Scaler::new(scaler_type).fit_transform(&features, &names)?
            }
        };

        let setup = Self::new(x, y, scaler != ScalerType::None)?;
        info!(
            rows = setup.n_samples(),
            features = setup.x_train.width(),
            scaler = %scaler,
            "Setup prepared"
        );
        Ok(setup)
    }

    pub fn x_train(&self) -> &DataFrame {
        &self.x_train
    }

    pub fn y_clf_train(&self) -> &Array1<f64> {
        &self.y_clf_train
    }

    pub fn feature_scaling(&self) -> bool {
        self.feature_scaling
    }

    pub fn n_samples(&self) -> usize {
        self.x_train.height()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.x_train.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    /// Check that every requested feature exists
    pub fn check_features(&self, feature_list: &[String]) -> Result<()> {
        for name in feature_list {
            if self.x_train.column(name).is_err() {
                return Err(CarrotError::FeatureNotFound(name.clone()));
            }
        }
        Ok(())
    }

    /// Feature matrix, restricted to `feature_list` when given
    pub fn features(&self, feature_list: Option<&[String]>) -> Result<Array2<f64>> {
        match feature_list {
            Some(names) => {
                self.check_features(names)?;
                columns_to_array2(&self.x_train, names)
            }
            None => columns_to_array2(&self.x_train, &self.feature_names()),
        }
    }
}

fn check_labels(y: &Array1<f64>) -> Result<()> {
    if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        return Err(CarrotError::DataError(format!(
            "Binary labels must be 0 or 1, found {}",
            bad
        )));
    }
    let n_positive = y.iter().filter(|&&v| v == 1.0).count();
    if n_positive == 0 || n_positive == y.len() {
        return Err(CarrotError::DataError("Labels contain a single class".to_string()));
    }
    Ok(())
}

/// Cast every column to `Float64`, rejecting anything that does not survive the cast
fn numeric_frame(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let cast = column.cast(&DataType::Float64).map_err(|e| {
                CarrotError::DataError(format!("Feature '{}' is not numeric: {}", column.name(), e))
            })?;
            if cast.null_count() > 0 {
                return Err(CarrotError::DataError(format!(
                    "Feature '{}' has missing or non-numeric values",
                    column.name()
                )));
            }
            Ok(cast)
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Extract named `Float64` columns into a row-major `Array2<f64>`
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| CarrotError::FeatureNotFound(col_name.clone()))?;
            Ok(column.f64()?.into_no_null_iter().collect())
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_names.len()), |(r, c)| col_data[c][r]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "b" => &[1i32, 0, 1, 0],
            "label" => &[0i64, 0, 1, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_from_dataframe() {
        let setup = Setup::from_dataframe(&frame(), "label", ScalerType::Standard).unwrap();
        assert!(setup.feature_scaling());
        assert_eq!(setup.feature_names(), vec!["a", "b"]);
        assert_eq!(setup.y_clf_train().to_vec(), vec![0.0, 0.0, 1.0, 1.0]);

        let x = setup.features(None).unwrap();
        assert_eq!(x.dim(), (4, 2));
        assert!(x.column(0).sum().abs() < 1e-10);

        let unscaled = Setup::from_dataframe(&frame(), "label", ScalerType::None).unwrap();
        assert!(!unscaled.feature_scaling());
        assert_eq!(unscaled.features(None).unwrap()[[2, 0]], 3.0);
    }

    #[test]
    fn test_feature_subset() {
        let setup = Setup::from_dataframe(&frame(), "label", ScalerType::None).unwrap();
        let x = setup.features(Some(&["b".to_string()])).unwrap();
        assert_eq!(x.column(0).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);

        assert!(matches!(
            setup.features(Some(&["zzz".to_string()])),
            Err(CarrotError::FeatureNotFound(name)) if name == "zzz"
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            Setup::from_dataframe(&frame(), "target", ScalerType::None),
            Err(CarrotError::FeatureNotFound(_))
        ));

        let multiclass = df!("a" => &[1.0, 2.0, 3.0], "label" => &[0i64, 1, 2]).unwrap();
        assert!(Setup::from_dataframe(&multiclass, "label", ScalerType::None).is_err());

        let one_class = df!("a" => &[1.0, 2.0], "label" => &[1i64, 1]).unwrap();
        assert!(Setup::from_dataframe(&one_class, "label", ScalerType::None).is_err());

        let text = df!("a" => &["x", "y"], "label" => &[0i64, 1]).unwrap();
        assert!(matches!(
            Setup::from_dataframe(&text, "label", ScalerType::None),
            Err(CarrotError::DataError(_))
        ));

        let x = df!("a" => &[1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            Setup::new(x, Array1::from_vec(vec![0.0, 1.0]), false),
            Err(CarrotError::ShapeError { .. })
        ));
    }
}
