//! Data transformation: fit the column transformer on the training split and
//! turn both splits into dense matrices with the target as last column.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;
use ndarray::{concatenate, Array1, Array2, Axis};

use crate::artifact::save_artifact;
use crate::config::DataTransformationConfig;
use crate::error::{PipelineError, WrapErr};
use crate::frame::Frame;
use crate::preprocessing::{ColumnTransformer, FittedColumnTransformer};
use crate::schema::{DROP_COLUMNS, TARGET_COLUMN};

/// Transformed train and test matrices. The last column holds `price`.
#[derive(Debug)]
pub struct TransformationOutput {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
}

pub struct DataTransformation {
    config: DataTransformationConfig,
}

impl DataTransformation {
    pub fn new(config: DataTransformationConfig) -> Self {
        DataTransformation { config }
    }

    /// The unfitted transformer for the gemstone schema.
    pub fn build_transformer(&self) -> ColumnTransformer {
        info!("Data transformation initiated");
        ColumnTransformer::default()
    }

    pub fn fit_apply<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<TransformationOutput, PipelineError> {
        self.run(train_path.as_ref(), test_path.as_ref())
            .wrap_err("Data transformation failed")
    }

    fn run(&self, train_path: &Path, test_path: &Path) -> Result<TransformationOutput> {
        let train_frame = Frame::read_csv(train_path)?;
        let test_frame = Frame::read_csv(test_path)?;
        info!("Read train and test data completed");
        info!("Train dataframe head:\n{}", train_frame.head(5));
        info!("Test dataframe head:\n{}", test_frame.head(5));

        let transformer = self.build_transformer();

        let train_features = train_frame.drop_columns(&DROP_COLUMNS);
        let test_features = test_frame.drop_columns(&DROP_COLUMNS);
        let train_target = target_values(&train_frame).context("Invalid training target")?;
        let test_target = target_values(&test_frame).context("Invalid test target")?;
        info!("Feature columns: {:?}", train_features.column_names());

        let fitted = transformer.fit(&train_features)?;
        info!("Applying preprocessing object on training and testing datasets");
        let train = with_target(fitted.transform(&train_features)?, train_target)?;
        let test = with_target(fitted.transform(&test_features)?, test_target)?;

        self.save(&fitted)?;

        Ok(TransformationOutput {
            train,
            test,
            preprocessor_path: self.config.preprocessor_path.clone(),
        })
    }

    fn save(&self, fitted: &FittedColumnTransformer) -> Result<()> {
        save_artifact(&self.config.preprocessor_path, fitted)?;
        info!("Preprocessor saved");
        Ok(())
    }
}

/// The `price` column. Every row must carry a numeric value.
fn target_values(frame: &Frame) -> Result<Array1<f64>> {
    frame
        .numeric_values(TARGET_COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| anyhow!("Missing '{}' in row {}", TARGET_COLUMN, row + 1)))
        .collect()
}

fn with_target(features: Array2<f64>, target: Array1<f64>) -> Result<Array2<f64>> {
    let target = target.insert_axis(Axis(1));
    Ok(concatenate(Axis(1), &[features.view(), target.view()])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::load_artifact;
    use std::fs;

    const HEADER: &str = "id,carat,cut,color,clarity,depth,table,x,y,z,price";

    fn write(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn appends_price_as_last_column() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(
            dir.path(),
            "train.csv",
            &[
                "0,1.0,Ideal,E,VS1,61.0,55,6.0,6.1,3.7,5000",
                "1,0.5,Good,H,SI2,62.5,58,5.0,5.0,3.1,1200",
                "2,,Premium,,IF,60.0,57,7.1,7.0,4.3,9000",
            ],
        );
        let test = write(dir.path(), "test.csv", &["3,0.7,Fair,D,I1,63.0,60,5.6,5.6,3.5,2100"]);

        let config = DataTransformationConfig {
            preprocessor_path: dir.path().join("artifacts").join("preprocessor.json"),
        };
        let output = DataTransformation::new(config).fit_apply(&train, &test).unwrap();

        assert_eq!(output.train.dim(), (3, 10));
        assert_eq!(output.test.dim(), (1, 10));
        assert_eq!(output.train[[2, 9]], 9000.0);
        assert_eq!(output.test[[0, 9]], 2100.0);
        assert!(output.train.iter().all(|v| v.is_finite()));
        assert!(output.preprocessor_path.exists());
    }

    #[test]
    fn missing_price_fails() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(
            dir.path(),
            "train.csv",
            &[
                "0,1.0,Ideal,E,VS1,61.0,55,6.0,6.1,3.7,",
                "1,0.5,Good,H,SI2,62.5,58,5.0,5.0,3.1,1200",
            ],
        );
        let test = write(dir.path(), "test.csv", &["3,0.7,Fair,D,I1,63.0,60,5.6,5.6,3.5,2100"]);
        let config = DataTransformationConfig {
            preprocessor_path: dir.path().join("preprocessor.json"),
        };
        let err = DataTransformation::new(config)
            .fit_apply(&train, &test)
            .unwrap_err();
        assert!(format!("{}", err).contains("Missing 'price'"));
    }

    #[test]
    fn preprocessor_is_fitted_on_training_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(
            dir.path(),
            "train.csv",
            &[
                "0,1.0,Ideal,E,VS1,61.0,55,6.0,6.1,3.7,5000",
                "1,0.5,Good,H,SI2,62.5,58,5.0,5.0,3.1,1200",
                "2,0.8,Ideal,E,IF,60.0,57,7.1,7.0,4.3,9000",
                "3,0.6,Premium,G,VS1,61.5,56,5.5,5.5,3.4,2500",
            ],
        );
        // Extreme values and blanks that exist only in the test split.
        let test = write(
            dir.path(),
            "test.csv",
            &[
                "4,100.0,Fair,D,I1,90.0,95,60.0,60.0,40.0,99999",
                "5,,,,,,,,,,100",
            ],
        );
        let config = DataTransformationConfig {
            preprocessor_path: dir.path().join("preprocessor.json"),
        };
        let output = DataTransformation::new(config).fit_apply(&train, &test).unwrap();

        let saved: FittedColumnTransformer = load_artifact(&output.preprocessor_path).unwrap();
        let train_features = Frame::read_csv(&train).unwrap().drop_columns(&DROP_COLUMNS);
        let expected = ColumnTransformer::default().fit(&train_features).unwrap();

        assert_eq!(saved.numeric.len(), expected.numeric.len());
        for (s, e) in saved.numeric.iter().zip(&expected.numeric) {
            assert_eq!(s.name, e.name);
            assert!((s.fill_value - e.fill_value).abs() < 1e-9, "{}", s.name);
            assert!((s.scaler.mean - e.scaler.mean).abs() < 1e-9, "{}", s.name);
            assert!((s.scaler.std - e.scaler.std).abs() < 1e-9, "{}", s.name);
        }
        assert_eq!(saved.categorical.len(), expected.categorical.len());
        for (s, e) in saved.categorical.iter().zip(&expected.categorical) {
            assert_eq!(s.fill_value, e.fill_value, "{}", s.name);
            assert!((s.scaler.mean - e.scaler.mean).abs() < 1e-9, "{}", s.name);
            assert!((s.scaler.std - e.scaler.std).abs() < 1e-9, "{}", s.name);
        }

        let carat = saved.numeric.iter().find(|c| c.name == "carat").unwrap();
        assert!(carat.scaler.mean < 1.0);
        assert!(carat.fill_value < 1.0);
        // The all-blank test row is imputed with training statistics.
        assert!(output.test.row(1).iter().all(|v| v.is_finite()));
    }
}
