//! QVD binary format parsing and the in-memory table model.
//!
//! This module contains types and functions for the on-disk structures of
//! QlikView Data files — the XML descriptor header, the column-major symbol
//! table, and the bit-packed row index — plus the [`table::Table`] model
//! they decode into and the operations it supports.
//!
//! Start with [`reader::read_file`] to load a `.qvd` file, or build a
//! [`table::Table`] from native values and hand it to
//! [`writer::write_file`].

pub mod constants;
pub mod export;
pub mod format;
pub mod header;
pub mod index;
pub mod reader;
pub mod symbols;
pub mod table;
pub mod value;
pub mod writer;
