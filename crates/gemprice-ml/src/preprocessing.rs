//! Column-wise preprocessing: imputation, ordinal encoding and standard
//! scaling, combined into a column transformer.
//!
//! `ColumnTransformer` only describes which columns go through which steps.
//! Fitting it against a training frame yields a `FittedColumnTransformer`,
//! the only type that can transform data, so a transform can never run on
//! unfitted state. The fitted parameters serialize to plain JSON.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::frame::Frame;
use crate::schema::{category_rankings, CATEGORICAL_COLUMNS, NUMERICAL_COLUMNS};

/// Simple standard scaler state for one column (population mean/std).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: f64,
    pub std: f64,
}

impl Scaler {
    /// Deviations below this are treated as constant columns and scaled by 1.
    const MIN_STD: f64 = 10.0 * f64::EPSILON;

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Fit a `Scaler` on the values of a single column.
pub fn fit_scaler(values: &[f64]) -> Result<Scaler> {
    if values.is_empty() {
        bail!("fit_scaler requires at least one value");
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    let std = if std < Scaler::MIN_STD { 1.0 } else { std };
    Ok(Scaler { mean, std })
}

/// Median of the observed values, averaging the middle pair for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties go to the lexicographically smallest value.
pub fn most_frequent(values: &[String]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Numeric pipeline: median imputation followed by standard scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericPipeline {
    pub columns: Vec<String>,
}

/// Categorical pipeline: most-frequent imputation, ordinal encoding with a
/// fixed ranking per column, then standard scaling of the codes.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoricalPipeline {
    pub columns: Vec<String>,
    pub categories: Vec<Vec<String>>,
}

/// Unfitted description of the column transformer.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnTransformer {
    pub numeric: NumericPipeline,
    pub categorical: CategoricalPipeline,
}

impl Default for ColumnTransformer {
    fn default() -> Self {
        ColumnTransformer {
            numeric: NumericPipeline {
                columns: NUMERICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            },
            categorical: CategoricalPipeline {
                columns: CATEGORICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
                categories: category_rankings(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedNumericColumn {
    pub name: String,
    pub fill_value: f64,
    pub scaler: Scaler,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedCategoricalColumn {
    pub name: String,
    pub fill_value: String,
    pub categories: Vec<String>,
    pub scaler: Scaler,
}

impl FittedCategoricalColumn {
    fn encode(&self, value: &str) -> Result<f64> {
        self.categories
            .iter()
            .position(|c| c == value)
            .map(|code| code as f64)
            .ok_or_else(|| {
                anyhow!(
                    "Found unknown category '{}' in column '{}'",
                    value,
                    self.name
                )
            })
    }
}

/// Fitted column transformer: the per-column fill values, category rankings
/// and scaling statistics learned from the training frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    pub numeric: Vec<FittedNumericColumn>,
    pub categorical: Vec<FittedCategoricalColumn>,
}

impl Artifact for FittedColumnTransformer {
    const KIND: &'static str = "column_transformer";
}

impl ColumnTransformer {
    pub fn fit(&self, frame: &Frame) -> Result<FittedColumnTransformer> {
        if frame.nrows() == 0 {
            bail!("Cannot fit the column transformer on an empty frame");
        }
        if self.categorical.columns.len() != self.categorical.categories.len() {
            bail!(
                "{} categorical columns but {} category rankings",
                self.categorical.columns.len(),
                self.categorical.categories.len()
            );
        }

        let mut numeric = Vec::with_capacity(self.numeric.columns.len());
        for name in &self.numeric.columns {
            let values = frame.numeric_values(name)?;
            let observed: Vec<f64> = values.iter().flatten().copied().collect();
            let fill_value = median(&observed)
                .ok_or_else(|| anyhow!("Column '{}' has no observed values to impute from", name))?;
            let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
            numeric.push(FittedNumericColumn {
                name: name.clone(),
                fill_value,
                scaler: fit_scaler(&imputed)?,
            });
        }

        let mut categorical = Vec::with_capacity(self.categorical.columns.len());
        for (name, categories) in self
            .categorical
            .columns
            .iter()
            .zip(&self.categorical.categories)
        {
            let values = frame.text_values(name)?;
            let observed: Vec<String> = values.iter().flatten().cloned().collect();
            let fill_value = most_frequent(&observed)
                .ok_or_else(|| anyhow!("Column '{}' has no observed values to impute from", name))?;

            let mut column = FittedCategoricalColumn {
                name: name.clone(),
                fill_value,
                categories: categories.clone(),
                scaler: Scaler { mean: 0.0, std: 1.0 },
            };
            let codes = values
                .iter()
                .map(|v| column.encode(v.as_deref().unwrap_or(&column.fill_value)))
                .collect::<Result<Vec<f64>>>()?;
            column.scaler = fit_scaler(&codes)?;
            categorical.push(column);
        }

        log::debug!(
            "Fitted column transformer on {} rows ({} numeric, {} categorical columns)",
            frame.nrows(),
            numeric.len(),
            categorical.len()
        );

        Ok(FittedColumnTransformer {
            numeric,
            categorical,
        })
    }
}

impl FittedColumnTransformer {
    /// Width of the transformed feature vector.
    pub fn n_features_out(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Output column names: numeric columns first, then categorical ones.
    pub fn feature_names(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.categorical.iter().map(|c| c.name.as_str()))
            .collect()
    }

    /// Transform a frame into a dense matrix with one row per frame row.
    ///
    /// Every column the transformer was fit on must be present; extra
    /// columns are ignored.
    pub fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let missing: Vec<&str> = self
            .feature_names()
            .into_iter()
            .filter(|name| frame.column(name).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("Columns missing from input frame: {:?}", missing);
        }

        let nrows = frame.nrows();
        let mut out = Array2::<f64>::zeros((nrows, self.n_features_out()));

        for (col_idx, column) in self.numeric.iter().enumerate() {
            let values = frame.numeric_values(&column.name)?;
            for (row, value) in values.into_iter().enumerate() {
                out[[row, col_idx]] = column.scaler.transform(value.unwrap_or(column.fill_value));
            }
        }

        let offset = self.numeric.len();
        for (col_idx, column) in self.categorical.iter().enumerate() {
            let values = frame.text_values(&column.name)?;
            for (row, value) in values.iter().enumerate() {
                let code = column.encode(value.as_deref().unwrap_or(&column.fill_value))?;
                out[[row, offset + col_idx]] = column.scaler.transform(code);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    #[test]
    fn fit_scaler_handles_constant_column() {
        let sc = fit_scaler(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(sc.mean, 3.0);
        assert_eq!(sc.std, 1.0);
        assert_eq!(sc.transform(3.0), 0.0);
    }

    #[test]
    fn median_of_even_and_odd_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn most_frequent_breaks_ties_alphabetically() {
        let values: Vec<String> = ["b", "a", "b", "a", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(most_frequent(&values), Some("a".to_string()));
    }

    #[test]
    fn unknown_category_fails_fit() {
        let transformer = ColumnTransformer {
            numeric: NumericPipeline { columns: vec![] },
            categorical: CategoricalPipeline {
                columns: vec!["cut".to_string()],
                categories: vec![vec!["Fair".to_string(), "Ideal".to_string()]],
            },
        };
        let frame = Frame::new(vec![Column::text(
            "cut",
            vec![Some("Fair".to_string()), Some("Excellent".to_string())],
        )])
        .unwrap();
        let err = transformer.fit(&frame).unwrap_err();
        assert!(err.to_string().contains("unknown category 'Excellent'"));
    }
}
