//! Data ingestion: copy the source CSV into the artifacts directory and
//! split it into train and test partitions.
use std::path::PathBuf;

use anyhow::{bail, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::DataIngestionConfig;
use crate::error::{PipelineError, WrapErr};
use crate::io::{read_csv_rows, write_csv_rows};

/// Shuffle `0..n` with a seeded generator and cut it into
/// `(train_indices, test_indices)`. The test side receives
/// `ceil(test_size * n)` rows.
pub fn split_indices(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        bail!("test_size must lie in (0, 1), got {}", test_size);
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        bail!(
            "Cannot split {} rows with test_size {}: one partition would be empty",
            n,
            test_size
        );
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

pub struct DataIngestion {
    config: DataIngestionConfig,
}

impl DataIngestion {
    pub fn new(config: DataIngestionConfig) -> Self {
        DataIngestion { config }
    }

    /// Run ingestion and return `(train_path, test_path)`.
    pub fn ingest(&self) -> Result<(PathBuf, PathBuf), PipelineError> {
        info!("Data ingestion started");
        self.run().wrap_err("Data ingestion failed")
    }

    fn run(&self) -> Result<(PathBuf, PathBuf)> {
        let cfg = &self.config;
        let data = read_csv_rows(&cfg.source_data_path)?;
        info!(
            "Read {} rows x {} columns from {}",
            data.len(),
            data.headers.len(),
            cfg.source_data_path.display()
        );

        write_csv_rows(&cfg.raw_data_path, &data)?;
        info!("Raw copy written to {}", cfg.raw_data_path.display());

        let (train_idx, test_idx) = split_indices(data.len(), cfg.test_size, cfg.random_seed)?;
        info!(
            "Train test split: {} train rows, {} test rows (seed {})",
            train_idx.len(),
            test_idx.len(),
            cfg.random_seed
        );

        write_csv_rows(&cfg.train_data_path, &data.select(&train_idx))?;
        write_csv_rows(&cfg.test_data_path, &data.select(&test_idx))?;
        info!("Ingestion of data is completed");

        Ok((cfg.train_data_path.clone(), cfg.test_data_path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn split_sizes_round_test_side_up() {
        let (train, test) = split_indices(11, 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_is_disjoint_and_covering() {
        let (train, test) = split_indices(50, 0.2, 7).unwrap();
        let mut all: HashSet<usize> = train.iter().copied().collect();
        for i in &test {
            assert!(all.insert(*i), "index {} in both partitions", i);
        }
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        assert_eq!(split_indices(30, 0.2, 42).unwrap(), split_indices(30, 0.2, 42).unwrap());
        assert_ne!(split_indices(30, 0.2, 42).unwrap(), split_indices(30, 0.2, 43).unwrap());
    }

    #[test]
    fn single_row_cannot_be_split() {
        assert!(split_indices(1, 0.2, 42).is_err());
        assert!(split_indices(0, 0.2, 42).is_err());
    }

    #[test]
    fn missing_source_is_a_pipeline_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataIngestionConfig {
            source_data_path: dir.path().join("absent.csv"),
            ..DataIngestionConfig::default()
        };
        let err = DataIngestion::new(config).ingest().unwrap_err();
        assert!(err.to_string().contains("Data ingestion failed"));
        assert!(err.location().file().ends_with("ingestion.rs"));
    }
}
