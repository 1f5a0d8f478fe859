use maud::{html, Markup, DOCTYPE};

use gemprice_ml::pipeline::GemstoneRecord;
use gemprice_ml::schema::{CLARITY_CATEGORIES, COLOR_CATEGORIES, CUT_CATEGORIES};

const NUMERIC_FIELDS: [(&str, &str); 6] = [
    ("carat", "Carat"),
    ("depth", "Depth"),
    ("table", "Table"),
    ("x", "Length x (mm)"),
    ("y", "Width y (mm)"),
    ("z", "Depth z (mm)"),
];

fn category_select(name: &str, label: &str, options: &[&str]) -> Markup {
    html! {
        div class="field" {
            label for=(name) { (label) }
            select id=(name) name=(name) required {
                option value="" disabled selected { "Select " (label) }
                @for value in options {
                    option value=(value) { (value) }
                }
            }
        }
    }
}

fn form() -> Markup {
    html! {
        form action="/predict" method="post" {
            @for (name, label) in NUMERIC_FIELDS {
                div class="field" {
                    label for=(name) { (label) }
                    input type="text" id=(name) name=(name) placeholder=(label) required;
                }
            }
            (category_select("cut", "Cut", &CUT_CATEGORIES))
            (category_select("color", "Color", &COLOR_CATEGORIES))
            (category_select("clarity", "Clarity", &CLARITY_CATEGORIES))
            button type="submit" { "Predict price" }
        }
    }
}

fn record_table(record: &GemstoneRecord) -> Markup {
    html! {
        table class="record" {
            thead {
                tr {
                    th { "carat" } th { "depth" } th { "table" }
                    th { "x" } th { "y" } th { "z" }
                    th { "cut" } th { "color" } th { "clarity" }
                }
            }
            tbody {
                tr {
                    td { (record.carat) } td { (record.depth) } td { (record.table) }
                    td { (record.x) } td { (record.y) } td { (record.z) }
                    td { (record.cut) } td { (record.color) } td { (record.clarity) }
                }
            }
        }
    }
}

/// The prediction page. With a result, the submitted record and the price
/// are shown under the form.
pub fn index(result: Option<(&GemstoneRecord, f64)>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Gemstone Price Prediction" }
                style {
                    "body { font-family: sans-serif; max-width: 640px; margin: 2em auto; }
                    .field { margin-bottom: 0.6em; }
                    .field label { display: inline-block; width: 10em; }
                    table.record { border-collapse: collapse; margin-top: 1em; }
                    table.record td, table.record th { border: 1px solid #ccc; padding: 4px 8px; }"
                }
            }
            body {
                h1 { "Gemstone Price Prediction" }
                (form())
                @if let Some((record, price)) = result {
                    h2 class="result" { "The predicted price is " (format!("{:.2}", price)) }
                    (record_table(record))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_every_input() {
        let page = index(None).into_string();
        for name in ["carat", "depth", "table", "x", "y", "z", "cut", "color", "clarity"] {
            assert!(page.contains(&format!("name=\"{}\"", name)), "missing {}", name);
        }
        assert!(!page.contains("predicted price"));
    }

    #[test]
    fn result_page_shows_price_and_record() {
        let record = GemstoneRecord {
            carat: 0.5,
            depth: 61.2,
            table: 55.0,
            x: 5.1,
            y: 5.12,
            z: 3.13,
            cut: "Ideal".to_string(),
            color: "E".to_string(),
            clarity: "VS1".to_string(),
        };
        let page = index(Some((&record, 1234.5))).into_string();
        assert!(page.contains("The predicted price is 1234.50"));
        assert!(page.contains("<td>Ideal</td>"));
    }
}
