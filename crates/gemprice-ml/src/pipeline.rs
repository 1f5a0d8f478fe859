//! Inference: load the persisted transformer and model pair and price
//! incoming gemstone records.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::artifact::load_artifact;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, WrapErr};
use crate::frame::{Column, Frame};
use crate::models::fitted::TrainedModel;
use crate::preprocessing::FittedColumnTransformer;

/// One gemstone as submitted by a user, before preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemstoneRecord {
    pub carat: f64,
    pub depth: f64,
    pub table: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub cut: String,
    pub color: String,
    pub clarity: String,
}

/// Parse a float the lenient way: surrounding whitespace is ignored and
/// `inf`/`nan` spellings are accepted.
pub fn parse_float(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("could not convert field '{}' to float: '{}'", field, raw))
}

fn json_float(body: &Value, field: &str) -> Result<f64> {
    match body.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| anyhow!("field '{}' is not representable as float", field)),
        Some(Value::String(s)) => parse_float(field, s),
        Some(other) => bail!("field '{}' must be a number, got {}", field, other),
        None => bail!("missing field '{}'", field),
    }
}

fn json_text(body: &Value, field: &str) -> Result<String> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => bail!("field '{}' must be a string, got {}", field, other),
        None => bail!("missing field '{}'", field),
    }
}

impl GemstoneRecord {
    /// Build a record from HTML form fields.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self> {
        let float = |name: &str| -> Result<f64> {
            let raw = fields
                .get(name)
                .ok_or_else(|| anyhow!("missing field '{}'", name))?;
            parse_float(name, raw)
        };
        let text = |name: &str| -> Result<String> {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("missing field '{}'", name))
        };
        Ok(GemstoneRecord {
            carat: float("carat")?,
            depth: float("depth")?,
            table: float("table")?,
            x: float("x")?,
            y: float("y")?,
            z: float("z")?,
            cut: text("cut")?,
            color: text("color")?,
            clarity: text("clarity")?,
        })
    }

    /// Build a record from a JSON object. Numbers may also arrive as strings.
    pub fn from_json(body: &Value) -> Result<Self> {
        if !body.is_object() {
            bail!("expected a JSON object, got {}", body);
        }
        Ok(GemstoneRecord {
            carat: json_float(body, "carat")?,
            depth: json_float(body, "depth")?,
            table: json_float(body, "table")?,
            x: json_float(body, "x")?,
            y: json_float(body, "y")?,
            z: json_float(body, "z")?,
            cut: json_text(body, "cut")?,
            color: json_text(body, "color")?,
            clarity: json_text(body, "clarity")?,
        })
    }

    /// One-row frame with columns `carat, depth, table, x, y, z, cut, color,
    /// clarity`.
    pub fn to_frame(&self) -> Result<Frame> {
        Frame::new(vec![
            Column::numeric("carat", vec![Some(self.carat)]),
            Column::numeric("depth", vec![Some(self.depth)]),
            Column::numeric("table", vec![Some(self.table)]),
            Column::numeric("x", vec![Some(self.x)]),
            Column::numeric("y", vec![Some(self.y)]),
            Column::numeric("z", vec![Some(self.z)]),
            Column::text("cut", vec![Some(self.cut.clone())]),
            Column::text("color", vec![Some(self.color.clone())]),
            Column::text("clarity", vec![Some(self.clarity.clone())]),
        ])
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fitted transformer plus selected model, ready for inference.
pub struct PredictPipeline {
    preprocessor: FittedColumnTransformer,
    model: TrainedModel,
}

impl PredictPipeline {
    /// Load both artifacts from the paths in `config`.
    pub fn load(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::from_paths(
            &config.transformation.preprocessor_path,
            &config.trainer.model_path,
        )
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        preprocessor_path: P,
        model_path: Q,
    ) -> Result<Self, PipelineError> {
        let load = || -> Result<Self> {
            let preprocessor: FittedColumnTransformer = load_artifact(preprocessor_path)?;
            let model: TrainedModel = load_artifact(model_path)?;
            if model.fitted.n_features() != preprocessor.n_features_out() {
                bail!(
                    "Model expects {} features but the preprocessor produces {}",
                    model.fitted.n_features(),
                    preprocessor.n_features_out()
                );
            }
            info!("Loaded model '{}' (test R2 {:.4})", model.name, model.test_r2);
            Ok(PredictPipeline {
                preprocessor,
                model,
            })
        };
        load().wrap_err("Failed to load prediction pipeline")
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    /// Unrounded predictions, one per frame row.
    pub fn predict(&self, features: &Frame) -> Result<Vec<f64>, PipelineError> {
        let run = || -> Result<Vec<f64>> {
            let data_scaled = self.preprocessor.transform(features)?;
            Ok(self.model.predict(&data_scaled)?.to_vec())
        };
        run().wrap_err("Prediction failed")
    }

    /// Price of a single record, unrounded.
    pub fn predict_record(&self, record: &GemstoneRecord) -> Result<f64, PipelineError> {
        let frame = record.to_frame().wrap_err("Invalid record")?;
        let predictions = self.predict(&frame)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| anyhow!("model returned no prediction"))
            .wrap_err("Prediction failed")
    }
}
