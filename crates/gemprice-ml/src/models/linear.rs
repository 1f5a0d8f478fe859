use anyhow::{anyhow, bail, Result};
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_elasticnet::{ElasticNet, ElasticNetParams};
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Ix1};

use crate::config::{ModelConfig, ModelType};
use crate::models::fitted::{FittedModel, LinearParameters};
use crate::models::regressor_trait::RegressorModel;

/// Linear family: ordinary least squares plus the L1/L2 penalised variants,
/// all reduced to a coefficient vector and an intercept once fitted.
pub struct LinearRegressor {
    name: String,
    model_type: ModelType,
    params: Option<LinearParameters>,
}

impl LinearRegressor {
    pub fn new(config: ModelConfig) -> Self {
        LinearRegressor {
            name: config.name,
            model_type: config.model_type,
            params: None,
        }
    }

    fn penalised(
        &self,
        alpha: f64,
        l1_ratio: f64,
        max_iterations: u32,
        tolerance: f64,
    ) -> ElasticNetParams<f64> {
        ElasticNet::<f64>::params()
            .penalty(alpha)
            .l1_ratio(l1_ratio)
            .max_iterations(max_iterations)
            .tolerance(tolerance)
            .with_intercept(true)
    }
}

impl RegressorModel for LinearRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            bail!("{} rows in x but {} targets", x.nrows(), y.len());
        }
        let dataset = Dataset::new(x.to_owned(), y.to_owned());

        let params = match &self.model_type {
            ModelType::LinearRegression { fit_intercept } => {
                let fitted = LinearRegression::new()
                    .with_intercept(*fit_intercept)
                    .fit(&dataset)
                    .map_err(|e| anyhow!("{} failed to fit: {}", self.name, e))?;
                LinearParameters {
                    coefficients: fitted.params().to_vec(),
                    intercept: fitted.intercept(),
                }
            }
            ModelType::Lasso {
                alpha,
                max_iterations,
                tolerance,
            } => self.fit_penalised(&dataset, *alpha, 1.0, *max_iterations, *tolerance)?,
            ModelType::Ridge {
                alpha,
                max_iterations,
                tolerance,
            } => self.fit_penalised(&dataset, *alpha, 0.0, *max_iterations, *tolerance)?,
            ModelType::ElasticNet {
                alpha,
                l1_ratio,
                max_iterations,
                tolerance,
            } => self.fit_penalised(&dataset, *alpha, *l1_ratio, *max_iterations, *tolerance)?,
            other => bail!("Expected a linear model type, got {}", other),
        };

        log::debug!(
            "{}: coefficients={:?} intercept={}",
            self.name,
            params.coefficients,
            params.intercept
        );
        self.params = Some(params);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.params
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted", self.name))?
            .predict(x)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_fitted(self: Box<Self>) -> Result<FittedModel> {
        let name = self.name;
        self.params
            .map(FittedModel::Linear)
            .ok_or_else(|| anyhow!("{} has not been fitted", name))
    }
}

impl LinearRegressor {
    fn fit_penalised(
        &self,
        dataset: &Dataset<f64, f64, Ix1>,
        alpha: f64,
        l1_ratio: f64,
        max_iterations: u32,
        tolerance: f64,
    ) -> Result<LinearParameters> {
        let fitted = self
            .penalised(alpha, l1_ratio, max_iterations, tolerance)
            .fit(dataset)
            .map_err(|e| anyhow!("{} failed to fit: {}", self.name, e))?;
        Ok(LinearParameters {
            coefficients: fitted.hyperplane().to_vec(),
            intercept: fitted.intercept(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line() -> (Array2<f64>, Array1<f64>) {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = x.column(0).mapv(|v| 3.0 * v + 2.0);
        (x, y)
    }

    #[test]
    fn ordinary_least_squares_recovers_line() {
        let (x, y) = line();
        let mut model = LinearRegressor::new(ModelConfig::new(
            "ols",
            ModelType::LinearRegression { fit_intercept: true },
        ));
        model.fit(&x, &y).unwrap();
        let score = model.score(&x, &y).unwrap();
        assert!(score > 0.999, "score = {}", score);
    }

    #[test]
    fn lasso_shrinks_but_still_fits_trend() {
        let (x, y) = line();
        let mut model = LinearRegressor::new(ModelConfig::new(
            "lasso",
            "lasso".parse().unwrap(),
        ));
        model.fit(&x, &y).unwrap();
        let fitted = Box::new(model).into_fitted().unwrap();
        match fitted {
            FittedModel::Linear(params) => {
                assert!(params.coefficients[0] > 0.0);
                assert!(params.coefficients[0] < 3.0);
            }
            _ => panic!("expected linear parameters"),
        }
    }

    #[test]
    fn penalised_variants_fit_single_target() {
        let (x, y) = line();
        for key in ["ridge", "elasticnet"] {
            let mut model = LinearRegressor::new(ModelConfig::new(key, key.parse().unwrap()));
            model.fit(&x, &y).unwrap();
            let predictions = model.predict(&x).unwrap();
            assert_eq!(predictions.len(), y.len());
            assert!(
                predictions[5] > predictions[0],
                "{} lost the trend: {:?}",
                key,
                predictions
            );
        }
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let model = LinearRegressor::new(ModelConfig::new("ridge", "ridge".parse().unwrap()));
        assert!(model.predict(&array![[1.0]]).is_err());
    }
}
