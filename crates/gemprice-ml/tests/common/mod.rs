#![allow(dead_code)]
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use gemprice_ml::config::PipelineConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CUTS: [&str; 5] = ["Fair", "Good", "Very Good", "Premium", "Ideal"];
pub const COLORS: [&str; 7] = ["D", "E", "F", "G", "H", "I", "J"];
pub const CLARITIES: [&str; 8] = ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"];

/// Write a gemstone CSV whose price follows a known formula plus a little
/// noise. Every 25th row has a blank `carat` and every 40th a blank `cut`.
pub fn write_gemstone_csv(path: &Path, n: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from("id,carat,cut,color,clarity,depth,table,x,y,z,price");
    for id in 0..n {
        let carat: f64 = rng.gen_range(0.2..2.5);
        let cut = rng.gen_range(0..CUTS.len());
        let color = rng.gen_range(0..COLORS.len());
        let clarity = rng.gen_range(0..CLARITIES.len());
        let depth: f64 = rng.gen_range(58.0..64.0);
        let table: f64 = rng.gen_range(53.0..62.0);
        let x = 4.0 + 1.5 * carat + rng.gen_range(-0.1..0.1);
        let y = x + rng.gen_range(-0.05..0.05);
        let z = 0.62 * x + rng.gen_range(-0.05..0.05);
        let price = 500.0
            + 4000.0 * carat
            + 150.0 * cut as f64
            + 100.0 * (6 - color) as f64
            + 120.0 * clarity as f64
            + rng.gen_range(-100.0..100.0);

        let carat_cell = if id % 25 == 7 {
            String::new()
        } else {
            format!("{:.2}", carat)
        };
        let cut_cell = if id % 40 == 11 { "" } else { CUTS[cut] };
        let _ = write!(
            out,
            "\n{},{},{},{},{},{:.1},{:.0},{:.2},{:.2},{:.2},{:.0}",
            id, carat_cell, cut_cell, COLORS[color], CLARITIES[clarity], depth, table, x, y, z, price
        );
    }
    fs::write(path, out).unwrap();
}

/// A configuration whose every path lives under `root`.
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
    config.logging.directory = root.join("logs");
    config
}
