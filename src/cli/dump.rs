//! CLI implementation for the `qvd dump` subcommand.
//!
//! Hex dumps one of the three file sections with file-relative offsets:
//! the XML header (including the `\r\n\0` terminator), the column-major
//! symbol table, or the bit-packed index table.

use std::io::Write;

use crate::cli::{read_file_bytes, wprintln};
use crate::qvd::header::parse_header;
use crate::util::hex::{format_offset, hex_dump};
use crate::QvdError;

/// Options for the `qvd dump` subcommand.
pub struct DumpOptions {
    /// Path to the QVD file.
    pub file: String,
    /// Section to dump: header, symbols, or index.
    pub section: String,
    /// Maximum bytes to dump (defaults to 256).
    pub length: Option<usize>,
}

/// Hex dump a section of a QVD file.
pub fn execute(opts: &DumpOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    let bytes = read_file_bytes(&opts.file)?;
    let (header, header_end) = parse_header(&bytes)?;

    let symbol_end = (header_end + header.length as usize).min(bytes.len());
    let (start, end) = match opts.section.to_lowercase().as_str() {
        "header" => (0, header_end),
        "symbols" => (header_end, symbol_end),
        "index" => (symbol_end, bytes.len()),
        other => {
            return Err(QvdError::Argument(format!(
                "Unknown section '{}'. Use header, symbols, or index.",
                other
            )))
        }
    };

    let limit = opts.length.unwrap_or(256);
    let dump_end = end.min(start + limit);

    wprintln!(
        writer,
        "{} section of {}: {} bytes at offset {}",
        opts.section,
        opts.file,
        end - start,
        format_offset(start as u64)
    )?;
    wprintln!(writer)?;
    wprintln!(writer, "{}", hex_dump(&bytes[start..dump_end], start as u64))?;
    if dump_end < end {
        wprintln!(writer, "... {} more bytes", end - dump_end)?;
    }
    Ok(())
}
