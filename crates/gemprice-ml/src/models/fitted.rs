//! Fitted model parameters in their persisted form.
use anyhow::{bail, Result};
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::config::ModelType;

/// Hyperplane of a fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParameters {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearParameters {
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            bail!(
                "Linear model expects {} features, got {}",
                self.coefficients.len(),
                x.ncols()
            );
        }
        let w = Array1::from_vec(self.coefficients.clone());
        Ok(x.dot(&w) + self.intercept)
    }
}

/// Fitted parameters of any supported model family.
#[derive(Serialize, Deserialize)]
pub enum FittedModel {
    Linear(LinearParameters),
    Trees { feature_size: usize, ensemble: GBDT },
}

impl FittedModel {
    pub fn n_features(&self) -> usize {
        match self {
            FittedModel::Linear(params) => params.coefficients.len(),
            FittedModel::Trees { feature_size, .. } => *feature_size,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            FittedModel::Linear(params) => params.predict(x),
            FittedModel::Trees {
                feature_size,
                ensemble,
            } => {
                if x.ncols() != *feature_size {
                    bail!(
                        "Tree model expects {} features, got {}",
                        feature_size,
                        x.ncols()
                    );
                }
                let data = to_test_data(x);
                let predictions = ensemble.predict(&data);
                Ok(predictions.into_iter().map(|v| v as f64).collect())
            }
        }
    }
}

/// Convert rows to the f32 sample vector used by the `gbdt` crate.
pub(crate) fn to_test_data(x: &Array2<f64>) -> DataVec {
    let mut data = DataVec::with_capacity(x.nrows());
    for row in x.rows() {
        let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        data.push(Data::new_training_data(features, 1.0, 0.0, None));
    }
    data
}

/// The selected model, as persisted by the trainer and loaded for inference.
#[derive(Serialize, Deserialize)]
pub struct TrainedModel {
    pub name: String,
    pub model_type: ModelType,
    pub test_r2: f64,
    pub fitted: FittedModel,
}

impl Artifact for TrainedModel {
    const KIND: &'static str = "regression_model";
}

impl TrainedModel {
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted.predict(x)
    }
}
