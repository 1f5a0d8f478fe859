//! gemprice-ml: training and inference pipeline for gemstone price regression.
//!
//! The crate covers the batch side (data ingestion, the train/test split,
//! fitting the column transformer, scoring a fixed set of candidate
//! regressors and persisting the winner) and the inference side
//! (`PredictPipeline`), which reloads the persisted artifacts and prices
//! individual records.
//!
//! Every stage returns the single `PipelineError` type at its boundary;
//! helpers below it use `anyhow`.
pub mod artifact;
pub mod config;
pub mod error;
pub mod frame;
pub mod ingestion;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod trainer;
pub mod transformation;
