//! Column names and fixed category rankings of the gemstone dataset.

pub const TARGET_COLUMN: &str = "price";
pub const ID_COLUMN: &str = "id";

/// Columns removed from the raw frame before it reaches the transformer.
pub const DROP_COLUMNS: [&str; 2] = [TARGET_COLUMN, ID_COLUMN];

pub const NUMERICAL_COLUMNS: [&str; 6] = ["carat", "depth", "table", "x", "y", "z"];
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["cut", "color", "clarity"];

pub const CUT_CATEGORIES: [&str; 5] = ["Fair", "Good", "Very Good", "Premium", "Ideal"];
pub const COLOR_CATEGORIES: [&str; 7] = ["D", "E", "F", "G", "H", "I", "J"];
pub const CLARITY_CATEGORIES: [&str; 8] = ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"];

/// Ordered rankings for each categorical column, in `CATEGORICAL_COLUMNS` order.
pub fn category_rankings() -> Vec<Vec<String>> {
    [&CUT_CATEGORIES[..], &COLOR_CATEGORIES[..], &CLARITY_CATEGORIES[..]]
        .iter()
        .map(|ranking| ranking.iter().map(|c| c.to_string()).collect())
        .collect()
}
