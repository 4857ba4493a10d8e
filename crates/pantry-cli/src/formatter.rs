//! Output formatting for tabular results.
//!
//! Supports table, JSON, CSV, and raw output formats.

use comfy_table::{Cell, ContentArrangement, Table as DisplayTable};
use serde_json::{json, Value as JsonValue};

use pantry_common::{Table, Value};
use pantry_storage::csv::codec;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

/// Formats a tabular result according to the specified format.
pub fn format_result(table: &Table, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(table),
        OutputFormat::Json => format_json(table),
        OutputFormat::Csv => codec::encode(table),
        OutputFormat::Raw => format_raw(table),
    }
}

/// Formats the result as a table.
fn format_table(table: &Table) -> String {
    let mut display = DisplayTable::new();

    display
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !table.columns().is_empty() {
        display.set_header(table.columns().iter().map(Cell::new));
    }

    for row in table.rows() {
        let cells: Vec<Cell> = row.iter().map(|v| Cell::new(v.to_string())).collect();
        display.add_row(cells);
    }

    format!("{display}\n")
}

/// Formats the result as JSON.
fn format_json(table: &Table) -> String {
    let rows: Vec<JsonValue> = table
        .rows()
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, value) in row.iter().enumerate() {
                let col_name = table
                    .columns()
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{i}"));
                obj.insert(col_name, value_to_json(value));
            }
            JsonValue::Object(obj)
        })
        .collect();

    let mut output = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
    output.push('\n');
    output
}

/// Formats the result as tab-separated raw values.
fn format_raw(table: &Table) -> String {
    let mut output = String::new();
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| v.to_field()).collect();
        output.push_str(&fields.join("\t"));
        output.push('\n');
    }
    output
}

/// Converts a value to a JSON value.
fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => json!(*i),
        Value::Float(f) => json!(*f),
        Value::Text(s) => json!(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_common::Row;

    fn sample() -> Table {
        let mut table = Table::empty(vec!["City".into(), "provider_count".into()]);
        table
            .push_row(Row::new(vec![
                Value::text("Springfield"),
                Value::Integer(2),
            ]))
            .unwrap();
        table
    }

    #[test]
    fn test_format_table_contains_header_and_values() {
        let output = format_result(&sample(), OutputFormat::Table);
        assert!(output.contains("City"));
        assert!(output.contains("provider_count"));
        assert!(output.contains("Springfield"));
    }

    #[test]
    fn test_format_json() {
        let output = format_result(&sample(), OutputFormat::Json);
        let parsed: Vec<serde_json::Map<String, JsonValue>> =
            serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["City"], json!("Springfield"));
        assert_eq!(parsed[0]["provider_count"], json!(2));
    }

    #[test]
    fn test_format_csv() {
        let output = format_result(&sample(), OutputFormat::Csv);
        assert_eq!(output, "City,provider_count\nSpringfield,2\n");
    }

    #[test]
    fn test_format_raw() {
        let output = format_result(&sample(), OutputFormat::Raw);
        assert_eq!(output, "Springfield\t2\n");
    }
}
