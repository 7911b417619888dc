//! Feature scaling for prepared datasets

use crate::error::{CarrotError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    #[default]
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

impl fmt::Display for ScalerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalerType::Standard => write!(f, "standard"),
            ScalerType::MinMax => write!(f, "minmax"),
            ScalerType::None => write!(f, "none"),
        }
    }
}

impl FromStr for ScalerType {
    type Err = CarrotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(ScalerType::Standard),
            "minmax" => Ok(ScalerType::MinMax),
            "none" => Ok(ScalerType::None),
            other => Err(CarrotError::InvalidParameter {
                name: "scaler".to_string(),
                value: other.to_string(),
                reason: "expected one of standard, minmax, none".to_string(),
            }),
        }
    }
}

/// Parameters for a fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Column-wise feature scaler over `Float64` columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|col_name| {
                let column = df
                    .column(col_name)
                    .map_err(|_| CarrotError::FeatureNotFound(col_name.to_string()))?;
                self.compute_params(col_name, column.as_materialized_series())
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    /// Builds all replacement columns first, then applies them in a single pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CarrotError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .map(|params| {
                let column = df
                    .column(&params.column)
                    .map_err(|_| CarrotError::FeatureNotFound(params.column.clone()))?;
                scale_series(column.as_materialized_series(), params)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_params(&self, column: &str, series: &Series) -> Result<ScalerParams> {
        let ca = series.f64()?;

        let (center, scale) = match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(1).unwrap_or(1.0);
                (mean, if std == 0.0 { 1.0 } else { std })
            }
            ScalerType::MinMax => {
                let min = ca.min().unwrap_or(0.0);
                let max = ca.max().unwrap_or(1.0);
                let range = max - min;
                (min, if range == 0.0 { 1.0 } else { range })
            }
            ScalerType::None => (0.0, 1.0),
        };

        Ok(ScalerParams {
            column: column.to_string(),
            center,
            scale,
        })
    }
}

fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
    let ca = series.f64()?;

    let scaled: Float64Chunked = ca
        .into_iter()
        .map(|opt| opt.map(|v| (v - params.center) / params.scale))
        .collect();

    Ok(scaled.with_name(series.name().clone()).into_series())
}
