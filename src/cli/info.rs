//! CLI implementation for the `qvd info` subcommand.
//!
//! Parses only the XML header and reports the table metadata plus a
//! per-field table of the bit layout (offset, width, bias), symbol counts,
//! declared number formats, and tags. The row data is never decoded, so
//! `info` stays fast on large files.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{read_file_bytes, wprintln};
use crate::qvd::header::{parse_header, TableHeader};
use crate::QvdError;

/// Options for the `qvd info` subcommand.
pub struct InfoOptions {
    /// Path to the QVD file.
    pub file: String,
    /// Output in JSON format.
    pub json: bool,
}

#[derive(Serialize)]
struct FieldSummary<'a> {
    name: &'a str,
    bit_offset: u32,
    bit_width: u32,
    bias: i64,
    symbols: u64,
    format: String,
    pattern: &'a str,
    tags: &'a [String],
}

#[derive(Serialize)]
struct InfoSummary<'a> {
    file: &'a str,
    table_name: &'a str,
    records: u64,
    record_byte_size: u32,
    header_bytes: u64,
    symbol_table_bytes: u64,
    fields: Vec<FieldSummary<'a>>,
}

fn summarize<'a>(file: &'a str, header: &'a TableHeader) -> InfoSummary<'a> {
    InfoSummary {
        file,
        table_name: &header.table_name,
        records: header.no_of_records,
        record_byte_size: header.record_byte_size,
        header_bytes: header.offset,
        symbol_table_bytes: header.length,
        fields: header
            .fields
            .headers
            .iter()
            .map(|f| FieldSummary {
                name: &f.field_name,
                bit_offset: f.bit_offset,
                bit_width: f.bit_width,
                bias: f.bias,
                symbols: f.no_of_symbols,
                format: f.number_format.kind.name().to_string(),
                pattern: &f.number_format.fmt,
                tags: &f.tags.values,
            })
            .collect(),
    }
}

/// Show table metadata and the per-field bit layout.
pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    let bytes = read_file_bytes(&opts.file)?;
    let (header, _) = parse_header(&bytes)?;
    let summary = summarize(&opts.file, &header);

    if opts.json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| QvdError::Io(format!("Cannot render JSON: {}", e)))?;
        wprintln!(writer, "{}", rendered)?;
        return Ok(());
    }

    wprintln!(writer, "{}: {}", "File".bold(), opts.file)?;
    wprintln!(writer, "{}: {}", "Table".bold(), summary.table_name)?;
    wprintln!(
        writer,
        "{}: {} ({} bytes per record)",
        "Records".bold(),
        summary.records,
        summary.record_byte_size
    )?;
    wprintln!(
        writer,
        "{}: header {} bytes, symbols {} bytes",
        "Layout".bold(),
        summary.header_bytes,
        summary.symbol_table_bytes
    )?;
    wprintln!(writer)?;
    wprintln!(
        writer,
        "{:<20} {:>6} {:>6} {:>6} {:>8}  {:<10} {}",
        "Field".bold(),
        "Off",
        "Bits",
        "Bias",
        "Symbols",
        "Format",
        "Tags"
    )?;
    for field in &summary.fields {
        wprintln!(
            writer,
            "{:<20} {:>6} {:>6} {:>6} {:>8}  {:<10} {}",
            field.name,
            field.bit_offset,
            field.bit_width,
            field.bias,
            field.symbols,
            if field.pattern.is_empty() {
                field.format.clone()
            } else {
                format!("{} ({})", field.format, field.pattern)
            },
            field.tags.join(" ")
        )?;
    }
    Ok(())
}
