use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::ArgMatches;
use gemprice_ml::config::PipelineConfig;

/// Load the configuration file when one is given, otherwise the defaults.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match config_path {
        Some(path) => {
            log::debug!("Loading config from {:?}", path);
            PipelineConfig::from_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Configuration for `train`: the file (if any) plus command line overrides.
pub fn train_config_from_arguments(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;

    if let Some(data) = matches.get_one::<String>("data") {
        config.ingestion.source_data_path = PathBuf::from(data);
    }
    validate_csv_file(&config.ingestion.source_data_path)?;

    Ok(config)
}

/// Configuration for `serve`: the file (if any) plus host/port overrides.
pub fn serve_config_from_arguments(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    Ok(config)
}

pub fn validate_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    if ext.as_deref() != Some("csv") {
        bail!("File must have a .csv extension: {}", path.display());
    }

    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn rejects_wrong_extension_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let tsv = dir.path().join("gems.tsv");
        fs::write(&tsv, "a\tb").unwrap();
        assert!(validate_csv_file(&tsv).is_err());
        assert!(validate_csv_file(&dir.path().join("absent.csv")).is_err());

        let csv = dir.path().join("gems.CSV");
        fs::write(&csv, "a,b").unwrap();
        assert!(validate_csv_file(&csv).is_ok());
    }

    #[test]
    fn no_config_file_means_defaults() {
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }
}
