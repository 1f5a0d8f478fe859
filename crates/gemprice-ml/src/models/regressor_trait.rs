use anyhow::Result;
use ndarray::{Array1, Array2};

use crate::metrics::r2_score;
use crate::models::fitted::FittedModel;

/// Common contract of the candidate regression models scored by the trainer.
pub trait RegressorModel {
    /// Fit on a feature matrix (rows are samples) and its target vector.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict one value per row of `x`. Fails if the model is not fitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Coefficient of determination of the predictions on `(x, y)`.
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        r2_score(y, &predictions)
    }

    /// Human readable name for the model
    fn name(&self) -> &str {
        "regressor"
    }

    /// Hand over the fitted parameters for persistence.
    fn into_fitted(self: Box<Self>) -> Result<FittedModel>;
}
