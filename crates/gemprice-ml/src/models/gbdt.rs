use anyhow::{anyhow, bail, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::models::fitted::{to_test_data, FittedModel};
use crate::models::regressor_trait::RegressorModel;

/// Tree regressors backed by the `gbdt` crate.
///
/// A single regression tree is a one-round ensemble with no shrinkage;
/// gradient boosting uses the configured rounds and learning rate. Both use
/// the squared-error loss.
pub struct GBDTRegressor {
    name: String,
    model_type: ModelType,
    model: Option<GBDT>,
    feature_size: usize,
}

impl GBDTRegressor {
    pub fn new(config: ModelConfig) -> Self {
        GBDTRegressor {
            name: config.name,
            model_type: config.model_type,
            model: None,
            feature_size: 0,
        }
    }

    fn build_config(&self, feature_size: usize) -> Result<Config> {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_loss("SquaredError");
        config.set_debug(false);

        match &self.model_type {
            ModelType::DecisionTree {
                max_depth,
                min_leaf_size,
            } => {
                config.set_shrinkage(1.0);
                config.set_max_depth(*max_depth);
                config.set_iterations(1);
                config.set_min_leaf_size(*min_leaf_size);
            }
            ModelType::GBDT {
                learning_rate,
                max_depth,
                num_boost_round,
                min_leaf_size,
                training_optimization_level,
            } => {
                config.set_shrinkage(*learning_rate);
                config.set_max_depth(*max_depth);
                config.set_iterations(*num_boost_round as usize);
                config.set_min_leaf_size(*min_leaf_size);
                config.set_training_optimization_level(*training_optimization_level);
            }
            other => bail!("Expected a tree model type, got {}", other),
        }
        Ok(config)
    }
}

impl RegressorModel for GBDTRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            bail!("{} rows in x but {} targets", x.nrows(), y.len());
        }
        if x.nrows() == 0 {
            bail!("{} cannot be fitted on an empty matrix", self.name);
        }
        let feature_size = x.ncols();
        let config = self.build_config(feature_size)?;
        let mut gbdt = GBDT::new(&config);

        let mut train_x = DataVec::with_capacity(x.nrows());
        for (row, &label) in x.rows().into_iter().zip(y.iter()) {
            let train_row: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            train_x.push(Data::new_training_data(train_row, 1.0, label as f32, None));
        }

        gbdt.fit(&mut train_x);

        self.model = Some(gbdt);
        self.feature_size = feature_size;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted", self.name))?;
        if x.ncols() != self.feature_size {
            bail!(
                "{} expects {} features, got {}",
                self.name,
                self.feature_size,
                x.ncols()
            );
        }
        let predictions = model.predict(&to_test_data(x));
        Ok(predictions.into_iter().map(|v| v as f64).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_fitted(self: Box<Self>) -> Result<FittedModel> {
        let GBDTRegressor {
            name,
            model,
            feature_size,
            ..
        } = *self;
        let ensemble = model.ok_or_else(|| anyhow!("{} has not been fitted", name))?;
        Ok(FittedModel::Trees {
            feature_size,
            ensemble,
        })
    }
}
