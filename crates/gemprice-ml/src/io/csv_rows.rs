//! Verbatim CSV row storage used by ingestion.
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

/// A CSV file held as its header plus untouched string rows.
#[derive(Debug, Clone)]
pub struct CsvRows {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> CsvRows {
        CsvRows {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        find_column(&self.headers, name)
    }
}

/// Read a comma separated file with a header row.
pub fn read_csv_rows<P: AsRef<Path>>(path: P) -> Result<CsvRows> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open CSV file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();
    if headers.is_empty() {
        return Err(anyhow!(
            "CSV file has no columns: {}",
            path.as_ref().display()
        ));
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        rows.push(record);
    }

    Ok(CsvRows { headers, rows })
}

/// Write rows with their header, creating the parent directory if needed.
pub fn write_csv_rows<P: AsRef<Path>>(path: P, data: &CsvRows) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(&data.headers)?;
    for record in &data.rows {
        writer.write_record(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

pub(crate) fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_cells_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        fs::write(&src, "id,cut,price\n0,Very Good,326\n1,,0.50\n").unwrap();

        let rows = read_csv_rows(&src).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.find_column("PRICE"), Some(2));

        let out = dir.path().join("nested/out.csv");
        write_csv_rows(&out, &rows).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "id,cut,price\n0,Very Good,326\n1,,0.50\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_csv_rows("/nonexistent/data.csv").unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
