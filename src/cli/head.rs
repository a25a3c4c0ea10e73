//! CLI implementation for the `qvd head` subcommand.

use std::io::Write;

use colored::Colorize;

use crate::cli::wprintln;
use crate::qvd::export::table_to_json;
use crate::qvd::reader::read_file;
use crate::QvdError;

/// Options for the `qvd head` subcommand.
pub struct HeadOptions {
    /// Path to the QVD file.
    pub file: String,
    /// Number of rows to print.
    pub rows: usize,
    /// Output in JSON format.
    pub json: bool,
}

/// Print the first rows of the table, rendered through display values.
pub fn execute(opts: &HeadOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    let table = read_file(&opts.file)?;
    let head = table.head(opts.rows);

    if opts.json {
        let rendered = serde_json::to_string_pretty(&table_to_json(&head))
            .map_err(|e| QvdError::Io(format!("Cannot render JSON: {}", e)))?;
        wprintln!(writer, "{}", rendered)?;
        return Ok(());
    }

    let names = head.column_names();
    wprintln!(
        writer,
        "{}",
        names
            .iter()
            .map(|n| n.bold().to_string())
            .collect::<Vec<_>>()
            .join("\t")
    )?;
    for i in 0..head.row_count() {
        let line = (0..head.column_count())
            .map(|j| head.value_at(i, j).display().into_owned())
            .collect::<Vec<_>>()
            .join("\t");
        wprintln!(writer, "{}", line)?;
    }
    if table.row_count() > head.row_count() {
        wprintln!(
            writer,
            "({} of {} rows)",
            head.row_count(),
            table.row_count()
        )?;
    }
    Ok(())
}
