//! A small column-named table: the shape the transformer is fit on and the
//! shape a single incoming record is converted to before inference.
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, bail, Result};

use crate::io::{read_csv_rows, CsvRows};

/// Cell spellings treated as missing values when reading CSV text.
const NA_VALUES: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    fn cell_to_string(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Numeric(values) => match values[row] {
                Some(v) if !v.is_nan() => v.to_string(),
                _ => "NaN".to_string(),
            },
            ColumnData::Text(values) => values[row].clone().unwrap_or_else(|| "NaN".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    nrows: usize,
}

impl Frame {
    /// Build a frame, checking that column lengths agree and names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.data.len() != nrows {
                bail!(
                    "Column '{}' has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    nrows
                );
            }
            if !seen.insert(column.name.as_str()) {
                bail!("Duplicate column name '{}'", column.name);
            }
        }
        Ok(Frame { columns, nrows })
    }

    /// Convert raw CSV rows, inferring a numeric column whenever every
    /// non-missing cell parses as a float.
    pub fn from_rows(data: &CsvRows) -> Result<Self> {
        let mut columns = Vec::with_capacity(data.headers.len());
        for (idx, header) in data.headers.iter().enumerate() {
            let mut cells = Vec::with_capacity(data.len());
            for (row_idx, record) in data.rows.iter().enumerate() {
                let cell = record.get(idx).ok_or_else(|| {
                    anyhow!("Missing value for column '{}' at row {}", header, row_idx + 1)
                })?;
                cells.push(normalize_cell(cell));
            }

            let parsed: Option<Vec<Option<f64>>> = cells
                .iter()
                .map(|cell| match cell {
                    None => Some(None),
                    Some(text) => text.parse::<f64>().ok().map(Some),
                })
                .collect();

            let name = header.trim().to_string();
            columns.push(match parsed {
                Some(values) => Column::numeric(name, values),
                None => Column::text(name, cells),
            });
        }
        Frame::new(columns)
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let rows = read_csv_rows(path)?;
        Frame::from_rows(&rows)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// A copy without the named columns. Names that are absent are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .filter(|c| !names.contains(&c.name.as_str()))
                .cloned()
                .collect(),
            nrows: self.nrows,
        }
    }

    /// Values of a numeric column; `NaN` cells come back as `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .column(name)
            .ok_or_else(|| anyhow!("Column '{}' not found in frame", name))?;
        match &column.data {
            ColumnData::Numeric(values) => Ok(values
                .iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect()),
            ColumnData::Text(_) => bail!("Column '{}' is not numeric", name),
        }
    }

    /// Values of a column read as text. Numeric columns are formatted.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .column(name)
            .ok_or_else(|| anyhow!("Column '{}' not found in frame", name))?;
        Ok(match &column.data {
            ColumnData::Text(values) => values.clone(),
            ColumnData::Numeric(values) => values
                .iter()
                .map(|v| v.filter(|x| !x.is_nan()).map(|x| x.to_string()))
                .collect(),
        })
    }

    /// Tab separated rendering of the first `n` rows, for log output.
    pub fn head(&self, n: usize) -> String {
        let mut out = self.column_names().join("\t");
        for row in 0..self.nrows.min(n) {
            out.push('\n');
            let cells: Vec<String> = self.columns.iter().map(|c| c.cell_to_string(row)).collect();
            let _ = write!(out, "{}", cells.join("\t"));
        }
        out
    }
}

fn normalize_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if NA_VALUES.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
