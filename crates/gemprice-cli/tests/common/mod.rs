#![allow(dead_code)]
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use gemprice_ml::config::PipelineConfig;
use gemprice_ml::logging::LogSink;

const CUTS: [&str; 5] = ["Fair", "Good", "Very Good", "Premium", "Ideal"];
const COLORS: [&str; 7] = ["D", "E", "F", "G", "H", "I", "J"];
const CLARITIES: [&str; 8] = ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"];

/// Deterministic gemstone CSV whose price rises with carat and grade.
pub fn write_gemstone_csv(path: &Path, n: usize) {
    let mut out = String::from("id,carat,cut,color,clarity,depth,table,x,y,z,price");
    for id in 0..n {
        let carat = 0.2 + (id % 23) as f64 * 0.1;
        let cut = id % CUTS.len();
        let color = (id / 3) % COLORS.len();
        let clarity = (id / 2) % CLARITIES.len();
        let depth = 59.0 + (id % 9) as f64 * 0.5;
        let table = 54.0 + (id % 6) as f64;
        let x = 4.0 + 1.5 * carat + (id % 3) as f64 * 0.02;
        let y = x + ((id % 7) as f64 - 3.0) * 0.01;
        let z = 0.62 * x + (id % 4) as f64 * 0.01;
        let price = 500.0
            + 4000.0 * carat
            + 150.0 * cut as f64
            + 100.0 * (6 - color) as f64
            + 120.0 * clarity as f64;
        let _ = write!(
            out,
            "\n{},{:.2},{},{},{},{:.1},{:.0},{:.2},{:.2},{:.2},{:.0}",
            id, carat, CUTS[cut], COLORS[color], CLARITIES[clarity], depth, table, x, y, z, price
        );
    }
    fs::write(path, out).unwrap();
}

/// Configuration rooted at `root`, logging to stderr only.
pub fn config_in(root: &Path) -> PipelineConfig {
    let artifacts = root.join("artifacts");
    let mut config = PipelineConfig::default();
    config.ingestion.source_data_path = root.join("gemstone.csv");
    config.ingestion.raw_data_path = artifacts.join("data.csv");
    config.ingestion.train_data_path = artifacts.join("train.csv");
    config.ingestion.test_data_path = artifacts.join("test.csv");
    config.transformation.preprocessor_path = artifacts.join("preprocessor.json");
    config.trainer.model_path = artifacts.join("model.json");
    config.trainer.report_path = artifacts.join("model_report.json");
    config.logging.sink = LogSink::Stderr;
    config.logging.directory = root.join("logs");
    config
}

pub fn write_config(root: &Path, config: &PipelineConfig) -> std::path::PathBuf {
    let path = root.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}
