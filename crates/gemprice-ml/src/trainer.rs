//! Model trainer: fit every candidate, pick the best held-out R², persist it.
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use log::info;
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::artifact::{save_artifact, Artifact};
use crate::config::{ModelConfig, ModelTrainerConfig};
use crate::error::{PipelineError, WrapErr};
use crate::metrics::RegressionMetrics;
use crate::models::factory::build_model;
use crate::models::fitted::TrainedModel;
use crate::models::regressor_trait::RegressorModel;

/// Held-out score of one candidate. A non-finite R² is recorded as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub model: String,
    pub r2: Option<f64>,
}

/// Per-candidate scores plus the winner's metrics on both splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub candidates: Vec<CandidateScore>,
    pub best_model: String,
    pub train_metrics: RegressionMetrics,
    pub test_metrics: RegressionMetrics,
}

impl Artifact for ModelReport {
    const KIND: &'static str = "model_report";
}

pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub report: ModelReport,
    pub model_path: PathBuf,
}

/// Split a matrix whose last column is the target into `(x, y)`.
pub fn split_target(matrix: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    if matrix.ncols() < 2 {
        bail!(
            "Expected at least one feature column plus the target, got {} columns",
            matrix.ncols()
        );
    }
    let last = matrix.ncols() - 1;
    Ok((
        matrix.slice(s![.., ..last]).to_owned(),
        matrix.column(last).to_owned(),
    ))
}

pub struct ModelTrainer {
    config: ModelTrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: ModelTrainerConfig) -> Self {
        ModelTrainer { config }
    }

    pub fn train(
        &self,
        train: &Array2<f64>,
        test: &Array2<f64>,
    ) -> Result<TrainingOutcome, PipelineError> {
        self.run(train, test).wrap_err("Model training failed")
    }

    fn run(&self, train: &Array2<f64>, test: &Array2<f64>) -> Result<TrainingOutcome> {
        info!("Splitting training and test input data");
        let (x_train, y_train) = split_target(train)?;
        let (x_test, y_test) = split_target(test)?;
        if x_train.ncols() != x_test.ncols() {
            bail!(
                "Train has {} features but test has {}",
                x_train.ncols(),
                x_test.ncols()
            );
        }

        let (scores, best_idx, best) =
            evaluate_models(&self.config.candidates, &x_train, &y_train, &x_test, &y_test)?;
        let best_config = &self.config.candidates[best_idx];
        let best_r2 = scores[best_idx].r2.unwrap_or(f64::NAN);

        info!("Model report:");
        for score in &scores {
            match score.r2 {
                Some(r2) => info!("  {:<20} R2 = {:.4}", score.name, r2),
                None => info!("  {:<20} R2 = NaN", score.name),
            }
        }
        info!(
            "Best model found, model name is {}, R2 score: {:.4}",
            best_config.name, best_r2
        );

        let train_metrics = RegressionMetrics::compute(&y_train, &best.predict(&x_train)?)?;
        let test_metrics = RegressionMetrics::compute(&y_test, &best.predict(&x_test)?)?;
        log_metrics("Training", &train_metrics);
        log_metrics("Test", &test_metrics);

        let model = TrainedModel {
            name: best_config.name.clone(),
            model_type: best_config.model_type.clone(),
            test_r2: best_r2,
            fitted: best.into_fitted()?,
        };
        save_artifact(&self.config.model_path, &model)?;

        let report = ModelReport {
            candidates: scores,
            best_model: best_config.name.clone(),
            train_metrics,
            test_metrics,
        };
        save_artifact(&self.config.report_path, &report)?;

        Ok(TrainingOutcome {
            model,
            report,
            model_path: self.config.model_path.clone(),
        })
    }
}

/// Fit each candidate on the training split and score it on the test split.
///
/// Returns the scores in candidate order, the index of the winner and the
/// winning fitted model. Ties keep the earliest candidate.
fn evaluate_models(
    candidates: &[ModelConfig],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<(Vec<CandidateScore>, usize, Box<dyn RegressorModel>)> {
    if candidates.is_empty() {
        bail!("No candidate models configured");
    }

    let mut scores = Vec::with_capacity(candidates.len());
    let mut best: Option<(usize, f64, Box<dyn RegressorModel>)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        info!("Training {}...", candidate.name);
        let mut model = build_model(candidate.clone());
        model
            .fit(x_train, y_train)
            .map_err(|e| anyhow!("Failed to train {}: {:#}", candidate.name, e))?;
        info!("{} trained successfully.", candidate.name);

        let r2 = model.score(x_test, y_test)?;
        scores.push(CandidateScore {
            name: candidate.name.clone(),
            model: candidate.model_type.key().to_string(),
            r2: Some(r2).filter(|v| v.is_finite()),
        });

        let better = r2.is_finite() && best.as_ref().map_or(true, |(_, top, _)| r2 > *top);
        if better {
            best = Some((idx, r2, model));
        }
    }
    info!("All models evaluated successfully.");

    let (best_idx, _, model) =
        best.ok_or_else(|| anyhow!("No candidate produced a finite R2 score"))?;
    Ok((scores, best_idx, model))
}

fn log_metrics(split: &str, metrics: &RegressionMetrics) {
    info!("Model performance for {} set", split);
    info!("- Root Mean Squared Error: {:.4}", metrics.rmse);
    info!("- Mean Absolute Error: {:.4}", metrics.mae);
    info!("- R2 Score: {:.4}", metrics.r2);
}
