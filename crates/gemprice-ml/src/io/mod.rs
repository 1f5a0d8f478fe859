pub mod csv_rows;

pub use csv_rows::{read_csv_rows, write_csv_rows, CsvRows};
