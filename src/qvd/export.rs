//! Text export for tables.
//!
//! Reusable conversion of a [`Table`] to CSV (RFC 4180 escaping) and JSON,
//! shared by the `qvd export` subcommand and usable from the library. Cells
//! export through their display text; pure numeric cells pass through as
//! JSON numbers so downstream tools keep their types.

use serde_json::{json, Map};

use crate::qvd::table::Table;
use crate::qvd::value::Value;

/// RFC 4180 CSV escaping: fields containing the delimiter, quotes, or line
/// breaks are quoted, with embedded quotes doubled.
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the full table as CSV with a header row.
pub fn table_to_csv(table: &Table) -> String {
    let mut out = String::new();
    let names = table.column_names();
    out.push_str(
        &names
            .iter()
            .map(|n| csv_escape(n))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    for i in 0..table.row_count() {
        let line = (0..table.column_count())
            .map(|j| csv_escape(&table.value_at(i, j).display()))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// JSON rendering of one cell.
///
/// `Int` and finite `Double` become numbers; duals and text export their
/// display text; NULL and non-finite doubles become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Int(i) => json!(i),
        Value::Double(d) => {
            if d.is_finite() {
                json!(d)
            } else {
                serde_json::Value::Null
            }
        }
        Value::Text(s) | Value::DualInt(_, s) | Value::DualDouble(_, s) => json!(s),
    }
}

/// Render the full table as a JSON array of row objects.
pub fn table_to_json(table: &Table) -> serde_json::Value {
    let names = table.column_names();
    let mut rows = Vec::with_capacity(table.row_count());
    for i in 0..table.row_count() {
        let mut object = Map::new();
        for (j, name) in names.iter().enumerate() {
            object.insert(name.to_string(), value_to_json(table.value_at(i, j)));
        }
        rows.push(serde_json::Value::Object(object));
    }
    serde_json::Value::Array(rows)
}
