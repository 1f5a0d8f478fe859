//! Process-wide logger setup, driven by an explicit `LoggingConfig`.
//!
//! The file sink keeps the historical layout of the training logs: the
//! timestamped file name is first created as a directory under `logs/` and
//! the log file is written inside it, i.e.
//! `logs/10_16_2026_09_30_00.log/10_16_2026_09_30_00.log`.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::{Env, Target, WriteStyle};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "GEMPRICE_LOG";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogSink {
    Stderr,
    File,
    Both,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. `info` or `warn,gemprice_ml=debug`.
    pub level: String,
    pub sink: LogSink,
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sink: LogSink::Both,
            directory: PathBuf::from("logs"),
        }
    }
}

/// Path of the log file for a given timestamp stem.
pub fn log_file_path(directory: &Path, stamp: &str) -> PathBuf {
    let file_name = format!("{}.log", stamp);
    directory.join(&file_name).join(&file_name)
}

struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()
    }
}

fn open_log_file(directory: &Path) -> Result<(File, PathBuf)> {
    let stamp = chrono::Local::now().format("%m_%d_%Y_%H_%M_%S").to_string();
    let path = log_file_path(directory, &stamp);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    Ok((file, path))
}

/// Install the global logger. Returns the log file path when a file sink is
/// in use. Call once at process start.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let mut builder = env_logger::Builder::default();
    builder
        .filter_level(LevelFilter::Error)
        .parse_env(Env::default().filter_or(LOG_ENV_VAR, config.level.as_str()))
        .format(|buf, record| {
            writeln!(
                buf,
                "[ {} ] {} {} - {} - {}",
                buf.timestamp(),
                record.line().unwrap_or(0),
                record.target(),
                record.level(),
                record.args()
            )
        });

    let log_path = match config.sink {
        LogSink::Stderr => {
            builder.target(Target::Stderr);
            None
        }
        LogSink::File => {
            let (file, path) = open_log_file(&config.directory)?;
            builder
                .write_style(WriteStyle::Never)
                .target(Target::Pipe(Box::new(file)));
            Some(path)
        }
        LogSink::Both => {
            let (file, path) = open_log_file(&config.directory)?;
            builder
                .write_style(WriteStyle::Never)
                .target(Target::Pipe(Box::new(TeeWriter { file })));
            Some(path)
        }
    };

    builder.try_init().context("Logger already initialised")?;
    if let Some(path) = &log_path {
        log::debug!("Writing logs to {}", path.display());
    }
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_nests_inside_directory_named_after_it() {
        let path = log_file_path(Path::new("logs"), "01_02_2026_03_04_05");
        assert_eq!(
            path,
            PathBuf::from("logs/01_02_2026_03_04_05.log/01_02_2026_03_04_05.log")
        );
    }

    #[test]
    fn sink_names_are_snake_case() {
        let config: LoggingConfig = serde_json::from_str(r#"{"sink":"stderr"}"#).unwrap();
        assert_eq!(config.sink, LogSink::Stderr);
        assert_eq!(config.level, "info");
    }
}
