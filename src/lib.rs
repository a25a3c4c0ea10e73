//! QlikView Data (QVD) file toolkit.
//!
//! The `qvd-utils` crate (library name `qvd`) provides Rust types and
//! functions for reading, writing, and manipulating QVD files — the
//! proprietary binary columnar container QlikView and Qlik Sense use to
//! persist one data table per file. A QVD file is an XML header describing
//! schema and layout, followed by a column-major symbol table of distinct
//! values per field, followed by a row-major bit-packed index table whose
//! entries are offsets into the symbol table.
//!
//! # CLI Reference
//!
//! Install the `qvd` binary and use its subcommands to work with QVD files
//! from the command line.
//!
//! ## Subcommands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`qvd info`](cli::app::Commands::Info) | Show table metadata and per-field bit layout |
//! | [`qvd head`](cli::app::Commands::Head) | Print the first rows of the table |
//! | [`qvd export`](cli::app::Commands::Export) | Export the full table as CSV or JSON |
//! | [`qvd dump`](cli::app::Commands::Dump) | Hex dump of the header, symbol, or index section |
//!
//! ## Global options
//!
//! All subcommands accept `--color <auto|always|never>` and `--output <file>`.
//! `info` and `head` also accept `--json` for machine-readable output.
//!
//! See the [`cli`] module for full details.
//!
//! # Library API
//!
//! Add `qvd` as a dependency to use the codec and table model directly:
//!
//! ```toml
//! [dependencies]
//! qvd = { package = "qvd-utils", version = "0.3" }
//! ```
//!
//! ## Quick example
//!
//! ```no_run
//! use qvd::qvd::reader::read_file;
//! use qvd::qvd::writer::{write_file, WriteOptions};
//!
//! // Read a QVD file into an in-memory table
//! let table = read_file("sales.qvd").unwrap();
//! println!("{} rows x {} columns", table.row_count(), table.column_count());
//!
//! // Derive a filtered table and write it back out
//! let recent = table.filter_by("Year", |v| v.calc().is_some_and(|y| y >= 2024.0)).unwrap();
//! write_file("recent.qvd", &recent, &WriteOptions::default()).unwrap();
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`qvd::value`] | Tagged value variants, equality/hashing/ordering, native conversions |
//! | [`qvd::format`] | Number-format kinds and date/time/money display formatting |
//! | [`qvd::header`] | XML header parsing and deterministic emission |
//! | [`qvd::symbols`] | Column-major symbol table decode/encode |
//! | [`qvd::index`] | Bit-packed index table decode/encode and layout computation |
//! | [`qvd::table`] | In-memory table: cell access, mutation, filter, sort, concat, join |
//! | [`qvd::reader`] | Whole-file reads and chunked streaming reads |
//! | [`qvd::writer`] | Table-to-file encoding with display regeneration options |
//! | [`qvd::export`] | CSV and JSON text export |
//! | [`util::hex`] | Hex dump formatting for the `dump` subcommand |

#[cfg(feature = "cli")]
pub mod cli;
pub mod qvd;
pub mod util;

use thiserror::Error;

/// Errors returned by `qvd` operations.
#[derive(Error, Debug)]
pub enum QvdError {
    /// An I/O error occurred (open, read, seek, or write failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// The XML header is malformed (missing sentinel, invalid XML, missing
    /// required elements, inconsistent offsets or lengths).
    #[error("Malformed header: {0}")]
    Header(String),

    /// The symbol table is malformed (unknown tag byte, unterminated string,
    /// truncated payload, section overrun).
    #[error("Malformed symbol table: {0}")]
    SymbolTable(String),

    /// The index table is malformed (short section, bit range exceeding the
    /// record width, decoded code out of range).
    #[error("Malformed index table: {0}")]
    IndexTable(String),

    /// A value kind the codec cannot represent was encountered on write.
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    /// A chunked read was requested on a source that cannot seek.
    #[error("Unseekable stream: {0}")]
    Unseekable(String),

    /// A row or column had the wrong length for the table's shape.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// A column name was not found in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A column name collides with an existing column.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// An invalid argument was supplied (zero chunk size, bad option, etc.).
    #[error("Invalid argument: {0}")]
    Argument(String),
}
