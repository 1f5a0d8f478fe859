use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// A named candidate model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported regression models and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    LinearRegression {
        fit_intercept: bool,
    },
    Lasso {
        alpha: f64,
        max_iterations: u32,
        tolerance: f64,
    },
    Ridge {
        alpha: f64,
        max_iterations: u32,
        tolerance: f64,
    },
    ElasticNet {
        alpha: f64,
        l1_ratio: f64,
        max_iterations: u32,
        tolerance: f64,
    },
    DecisionTree {
        max_depth: u32,
        min_leaf_size: usize,
    },
    GBDT {
        learning_rate: f32,
        max_depth: u32,
        num_boost_round: u32,
        min_leaf_size: usize,
        training_optimization_level: u8,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LinearRegression { fit_intercept: true }
    }
}

impl ModelType {
    /// Short identifier, matching what `from_str` accepts.
    pub fn key(&self) -> &'static str {
        match self {
            ModelType::LinearRegression { .. } => "linear",
            ModelType::Lasso { .. } => "lasso",
            ModelType::Ridge { .. } => "ridge",
            ModelType::ElasticNet { .. } => "elasticnet",
            ModelType::DecisionTree { .. } => "decision_tree",
            ModelType::GBDT { .. } => "gbdt",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "linearregression" => Ok(ModelType::LinearRegression { fit_intercept: true }),
            "lasso" => Ok(ModelType::Lasso {
                alpha: 1.0,
                max_iterations: 1000,
                tolerance: 1e-4,
            }),
            "ridge" => Ok(ModelType::Ridge {
                alpha: 1.0,
                max_iterations: 1000,
                tolerance: 1e-4,
            }),
            "elasticnet" => Ok(ModelType::ElasticNet {
                alpha: 1.0,
                l1_ratio: 0.5,
                max_iterations: 1000,
                tolerance: 1e-4,
            }),
            "decision_tree" | "decisiontree" => Ok(ModelType::DecisionTree {
                max_depth: 8,
                min_leaf_size: 1,
            }),
            "gbdt" => Ok(ModelType::GBDT {
                learning_rate: 0.1,
                max_depth: 6,
                num_boost_round: 100,
                min_leaf_size: 1,
                training_optimization_level: 2,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: linear, lasso, ridge, elasticnet, decision_tree, gbdt",
                s
            )),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
        }
    }
}

/// The fixed candidate list scored on every training run.
pub fn default_candidates() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new(
            "LinearRegression",
            ModelType::LinearRegression { fit_intercept: true },
        ),
        ModelConfig::new(
            "Lasso",
            ModelType::Lasso {
                alpha: 1.0,
                max_iterations: 1000,
                tolerance: 1e-4,
            },
        ),
        ModelConfig::new(
            "Ridge",
            ModelType::Ridge {
                alpha: 1.0,
                max_iterations: 1000,
                tolerance: 1e-4,
            },
        ),
        ModelConfig::new(
            "ElasticNet",
            ModelType::ElasticNet {
                alpha: 1.0,
                l1_ratio: 0.5,
                max_iterations: 1000,
                tolerance: 1e-4,
            },
        ),
        ModelConfig::new(
            "DecisionTree",
            ModelType::DecisionTree {
                max_depth: 8,
                min_leaf_size: 1,
            },
        ),
        ModelConfig::new(
            "GradientBoosting",
            ModelType::GBDT {
                learning_rate: 0.1,
                max_depth: 6,
                num_boost_round: 100,
                min_leaf_size: 1,
                training_optimization_level: 2,
            },
        ),
    ]
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DataIngestionConfig {
    pub source_data_path: PathBuf,
    pub raw_data_path: PathBuf,
    pub train_data_path: PathBuf,
    pub test_data_path: PathBuf,
    pub test_size: f64,
    pub random_seed: u64,
}

impl Default for DataIngestionConfig {
    fn default() -> Self {
        Self {
            source_data_path: PathBuf::from("notebook/data/gemstone.csv"),
            raw_data_path: Path::new("artifacts").join("data.csv"),
            train_data_path: Path::new("artifacts").join("train.csv"),
            test_data_path: Path::new("artifacts").join("test.csv"),
            test_size: 0.2,
            random_seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DataTransformationConfig {
    pub preprocessor_path: PathBuf,
}

impl Default for DataTransformationConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: Path::new("artifacts").join("preprocessor.json"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelTrainerConfig {
    pub model_path: PathBuf,
    pub report_path: PathBuf,
    pub candidates: Vec<ModelConfig>,
}

impl Default for ModelTrainerConfig {
    fn default() -> Self {
        Self {
            model_path: Path::new("artifacts").join("model.json"),
            report_path: Path::new("artifacts").join("model_report.json"),
            candidates: default_candidates(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Central configuration for the training run and the prediction server.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingestion: DataIngestionConfig,
    pub transformation: DataTransformationConfig,
    pub trainer: ModelTrainerConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
        Ok(config)
    }
}
