//! QVD file writing.
//!
//! Encoding walks the table once per stage: per-column symbol encoding and
//! bit-layout computation, then header synthesis, then the bit-packed index
//! — emitted to the sink in header, symbol, index order. All output
//! accumulates in growable buffers, keeping a write O(N) in the row count.
//!
//! Formatter options regenerate the display component of dual symbols in
//! columns whose declared number-format kind matches, preserving the
//! numeric component and stamping the pattern into the emitted `Fmt`
//! element.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::qvd::constants::{DEFAULT_TABLE_NAME, QV_BUILD_NO};
use crate::qvd::format::{self, FormatKind, NumberFormat};
use crate::qvd::header::{self, FieldHeader, Fields, TableHeader, Tags};
use crate::qvd::index::{compute_width, pack_bits};
use crate::qvd::symbols;
use crate::qvd::table::{Column, Table};
use crate::qvd::value::Value;
use crate::QvdError;

/// Options controlling header metadata and display regeneration.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Header `TableName`; falls back to the table's own name, then "Table".
    pub table_name: Option<String>,
    /// Regenerate date dual displays with this pattern (e.g. `DD.MM.YYYY`).
    pub date_format: Option<String>,
    /// Regenerate time dual displays (e.g. `hh:mm:ss`).
    pub time_format: Option<String>,
    /// Regenerate timestamp dual displays.
    pub timestamp_format: Option<String>,
    /// Regenerate interval dual displays (e.g. `D hh:mm:ss`).
    pub interval_format: Option<String>,
    /// Regenerate money dual displays (e.g. `$#,##0.00`).
    pub money_format: Option<String>,
    /// Header `CreateUtcTime`; left empty when unset so that identical
    /// tables encode to identical bytes.
    pub create_utc_time: Option<String>,
}

/// Regenerated symbol list and number format for one column.
fn regenerate_column(column: &Column, options: &WriteOptions) -> (Vec<Value>, NumberFormat) {
    let mut number_format = column.number_format().clone();
    let pattern = match number_format.kind {
        FormatKind::Date => options.date_format.as_deref(),
        FormatKind::Time => options.time_format.as_deref(),
        FormatKind::Timestamp => options.timestamp_format.as_deref(),
        FormatKind::Interval => options.interval_format.as_deref(),
        FormatKind::Money => options.money_format.as_deref(),
        _ => None,
    };
    let pattern = match pattern {
        Some(p) => p,
        None => return (column.symbols().to_vec(), number_format),
    };

    number_format.fmt = pattern.to_string();
    let dec = if number_format.dec.is_empty() {
        "."
    } else {
        number_format.dec.as_str()
    };
    let thou = if number_format.thou.is_empty() {
        ","
    } else {
        number_format.thou.as_str()
    };
    let render = |n: f64| match number_format.kind {
        FormatKind::Interval => format::format_interval(n, pattern),
        FormatKind::Money => format::format_money(n, pattern, dec, thou),
        _ => format::format_serial(n, pattern),
    };

    let symbols = column
        .symbols()
        .iter()
        .map(|value| match value {
            Value::DualInt(i, _) => Value::DualInt(*i, render(*i as f64)),
            Value::DualDouble(d, _) => Value::DualDouble(*d, render(*d)),
            other => other.clone(),
        })
        .collect();
    (symbols, number_format)
}

/// Encode a table to a byte sink as a complete QVD file.
///
/// Emits header, symbol table, and index table in order. On error the
/// sink's state is undefined and should be discarded.
pub fn write_table<W: Write>(
    sink: &mut W,
    table: &Table,
    options: &WriteOptions,
) -> Result<(), QvdError> {
    let mut field_headers = Vec::with_capacity(table.column_count());
    let mut layouts = Vec::with_capacity(table.column_count());
    let mut symbol_blob: Vec<u8> = Vec::new();
    let mut bit_cursor = 0u32;

    for (j, column) in table.columns().iter().enumerate() {
        let has_null = table.rows().iter().any(|row| row[j].is_none());
        let (column_symbols, number_format) = regenerate_column(column, options);
        let encoded = symbols::encode_symbols(&column_symbols, column.name())?;
        let (bit_width, bias) = compute_width(column_symbols.len(), has_null);

        field_headers.push(FieldHeader {
            field_name: column.name().to_string(),
            bit_offset: bit_cursor,
            bit_width,
            bias,
            number_format,
            no_of_symbols: column_symbols.len() as u64,
            offset: symbol_blob.len() as u64,
            length: encoded.len() as u64,
            comment: String::new(),
            tags: Tags {
                values: column.tags().to_vec(),
            },
        });
        layouts.push((bit_cursor, bit_width, bias));
        symbol_blob.extend_from_slice(&encoded);
        bit_cursor += bit_width;
    }

    let record_byte_size = (bit_cursor as usize).div_ceil(8) as u32;
    let mut index_blob = vec![0u8; table.row_count() * record_byte_size as usize];
    let rbs = record_byte_size as usize;
    for (r, row) in table.rows().iter().enumerate() {
        let record = &mut index_blob[r * rbs..(r + 1) * rbs];
        for (j, &(bit_offset, bit_width, bias)) in layouts.iter().enumerate() {
            if bit_width == 0 {
                continue;
            }
            let raw = match row[j] {
                Some(code) => (code as i64 - bias) as u32,
                None => 0,
            };
            pack_bits(record, bit_offset, bit_width, raw);
        }
    }

    let table_name = options.table_name.clone().unwrap_or_else(|| {
        if table.name().is_empty() {
            DEFAULT_TABLE_NAME.to_string()
        } else {
            table.name().to_string()
        }
    });
    let header = TableHeader {
        qv_build_no: QV_BUILD_NO,
        create_utc_time: options.create_utc_time.clone().unwrap_or_default(),
        table_name,
        fields: Fields {
            headers: field_headers,
        },
        record_byte_size,
        no_of_records: table.row_count() as u64,
        length: symbol_blob.len() as u64,
        ..TableHeader::default()
    };
    let header_bytes = header::render_header(&header)?;

    sink.write_all(&header_bytes)
        .map_err(|e| QvdError::Io(format!("Cannot write header: {}", e)))?;
    sink.write_all(&symbol_blob)
        .map_err(|e| QvdError::Io(format!("Cannot write symbol table: {}", e)))?;
    sink.write_all(&index_blob)
        .map_err(|e| QvdError::Io(format!("Cannot write index table: {}", e)))?;
    Ok(())
}

/// Encode a table into a fresh byte buffer.
pub fn write_table_bytes(table: &Table, options: &WriteOptions) -> Result<Vec<u8>, QvdError> {
    let mut out = Vec::new();
    write_table(&mut out, table, options)?;
    Ok(out)
}

/// Encode a table to a `.qvd` file on disk.
pub fn write_file<P: AsRef<Path>>(
    path: P,
    table: &Table,
    options: &WriteOptions,
) -> Result<(), QvdError> {
    let path = path.as_ref();
    let mut file = File::create(path)
        .map_err(|e| QvdError::Io(format!("Cannot create {}: {}", path.display(), e)))?;
    write_table(&mut file, table, options)?;
    file.flush()
        .map_err(|e| QvdError::Io(format!("Cannot flush {}: {}", path.display(), e)))
}
