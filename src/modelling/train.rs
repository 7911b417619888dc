//! Cross-validate one default-configured algorithm

use super::catalogue::Algorithm;
use super::factory::get_model_instance;
use super::results::ComparisonRow;
use crate::data::Setup;
use crate::error::Result;
use crate::training::{cross_validate, CVConfig, Model, ModelInstance};
use tracing::debug;

/// Score `algorithm` with its default hyperparameters.
///
/// Metric columns are fold means and the fit time is the mean per-fold fit
/// time. With `return_model` the model is also refit on the whole training
/// split and returned.
pub fn train_model(
    algorithm: Algorithm,
    setup: &Setup,
    return_model: bool,
    cv: &CVConfig,
) -> Result<(Option<ModelInstance>, ComparisonRow)> {
    let x = setup.features(None)?;
    let y = setup.y_clf_train();
    let model = get_model_instance(algorithm, None)?;

    let result = cross_validate(&model, &x, y, cv)?;
    let row = ComparisonRow::new(algorithm, result.mean_scores(), result.mean_fit_time());
    debug!(
        algorithm = %algorithm,
        accuracy = row.accuracy,
        f1 = row.f1,
        roc_auc = row.roc_auc,
        fit_time_secs = row.fit_time_secs,
        "Algorithm cross-validated"
    );

    let model = if return_model {
        let mut model = model;
        model.fit(&x, y)?;
        Some(model)
    } else {
        None
    };

    Ok((model, row))
}
