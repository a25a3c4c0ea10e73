//! CLI implementation for the `qvd export` subcommand.
//!
//! Decodes the full table and writes it as CSV (RFC 4180 escaping) or a
//! JSON array of row objects.

use std::io::Write;

use crate::cli::wprintln;
use crate::qvd::export::{table_to_csv, table_to_json};
use crate::qvd::reader::read_file;
use crate::QvdError;

/// Output format for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn from_str(s: &str) -> Result<Self, QvdError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(QvdError::Argument(format!(
                "Unknown format '{}'. Use csv or json.",
                s
            ))),
        }
    }
}

/// Options for the `qvd export` subcommand.
pub struct ExportOptions {
    /// Path to the QVD file.
    pub file: String,
    /// Output format: csv or json.
    pub format: String,
}

/// Export the full table.
pub fn execute(opts: &ExportOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    let format = ExportFormat::from_str(&opts.format)?;
    let table = read_file(&opts.file)?;

    match format {
        ExportFormat::Csv => {
            let csv = table_to_csv(&table);
            writer
                .write_all(csv.as_bytes())
                .map_err(|e| QvdError::Io(format!("Cannot write output: {}", e)))?;
        }
        ExportFormat::Json => {
            let rendered = serde_json::to_string_pretty(&table_to_json(&table))
                .map_err(|e| QvdError::Io(format!("Cannot render JSON: {}", e)))?;
            wprintln!(writer, "{}", rendered)?;
        }
    }
    Ok(())
}
