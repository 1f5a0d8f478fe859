use crate::config::{ModelConfig, ModelType};
use crate::models::gbdt::GBDTRegressor;
use crate::models::linear::LinearRegressor;
use crate::models::regressor_trait::RegressorModel;

/// Build a boxed regressor from a `ModelConfig`.
pub fn build_model(params: ModelConfig) -> Box<dyn RegressorModel> {
    match params.model_type {
        ModelType::LinearRegression { .. }
        | ModelType::Lasso { .. }
        | ModelType::Ridge { .. }
        | ModelType::ElasticNet { .. } => Box::new(LinearRegressor::new(params)),

        ModelType::DecisionTree { .. } | ModelType::GBDT { .. } => {
            Box::new(GBDTRegressor::new(params))
        }
    }
}
