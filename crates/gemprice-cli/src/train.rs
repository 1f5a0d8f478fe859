use anyhow::Result;
use log::info;

use gemprice_ml::config::PipelineConfig;
use gemprice_ml::ingestion::DataIngestion;
use gemprice_ml::trainer::{ModelTrainer, TrainingOutcome};
use gemprice_ml::transformation::DataTransformation;

/// Ingestion, transformation and model selection, in that order.
pub fn run_training(config: &PipelineConfig) -> Result<TrainingOutcome> {
    let (train_path, test_path) = DataIngestion::new(config.ingestion.clone()).ingest()?;

    let transformed =
        DataTransformation::new(config.transformation.clone()).fit_apply(&train_path, &test_path)?;
    info!(
        "Transformed train {:?} and test {:?}; preprocessor at {}",
        transformed.train.dim(),
        transformed.test.dim(),
        transformed.preprocessor_path.display()
    );

    let outcome =
        ModelTrainer::new(config.trainer.clone()).train(&transformed.train, &transformed.test)?;
    info!(
        "Training complete: {} selected (test R2 {:.4}), saved to {}",
        outcome.model.name,
        outcome.model.test_r2,
        outcome.model_path.display()
    );

    Ok(outcome)
}
