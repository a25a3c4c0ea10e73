//! CLI subcommand implementations for the `qvd` binary.
//!
//! The `qvd` binary provides four subcommands for inspecting and exporting
//! QVD files. CLI argument parsing uses clap derive macros, with the
//! top-level [`app::Cli`] struct and [`app::Commands`] enum defined in
//! [`app`] and shared between `main.rs` and `build.rs` (for man page
//! generation) via `include!()`.
//!
//! Each subcommand module follows the same pattern: an `Options` struct
//! holding the parsed arguments and a `pub fn execute(opts, writer) ->
//! Result<(), QvdError>` entry point. The `writer: &mut dyn Write`
//! parameter allows output to be captured in tests or redirected to a file
//! via the global `--output` flag.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `qvd info` | [`info`] | Table metadata and per-field bit layout |
//! | `qvd head` | [`head`] | First rows of the table, display-rendered |
//! | `qvd export` | [`export`] | Full-table CSV or JSON export |
//! | `qvd dump` | [`dump`] | Hex dump of the header, symbol, or index section |
//!
//! # Common patterns
//!
//! - **`--json`** — `info` and `head` support structured JSON output via
//!   `serde_json`.
//! - **`--color`** (global) — Control colored terminal output (`auto`,
//!   `always`, `never`).
//! - **`--output` / `-o`** (global) — Redirect output to a file instead of
//!   stdout.

pub mod app;
pub mod dump;
pub mod export;
pub mod head;
pub mod info;

/// Write a line to the given writer, converting io::Error to QvdError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::QvdError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::QvdError::Io(e.to_string()))
    };
}

pub(crate) use wprintln;

use crate::QvdError;

/// Read a QVD file fully into memory with path context on failure.
pub(crate) fn read_file_bytes(path: &str) -> Result<Vec<u8>, QvdError> {
    std::fs::read(path).map_err(|e| QvdError::Io(format!("Cannot read {}: {}", path, e)))
}
