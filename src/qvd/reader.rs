//! QVD file reading.
//!
//! Provides [`read_table`] / [`read_file`] for whole-file decodes and
//! [`read_chunks`] for streaming the index table in fixed-size row chunks.
//! A whole-file read buffers the source once and decodes header, symbols,
//! and index in order. A chunked read loads the header and symbol table up
//! front, then seeks into the index table per chunk, so it requires a
//! seekable source; the seekability probe happens at construction and
//! fails fast with a typed error.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::qvd::constants::{HEADER_READ_CHUNK, HEADER_TERMINATOR, MAX_HEADER_SIZE};
use crate::qvd::header::{self, FieldHeader, TableHeader};
use crate::qvd::index::{self, FieldLayout};
use crate::qvd::symbols;
use crate::qvd::table::{Column, Table};
use crate::QvdError;

fn layout_of(field: &FieldHeader) -> FieldLayout {
    FieldLayout {
        bit_offset: field.bit_offset,
        bit_width: field.bit_width,
        bias: field.bias,
    }
}

/// Decode every column's symbol section from the symbol-table slice.
fn decode_columns(header: &TableHeader, symbol_buf: &[u8]) -> Result<Vec<Column>, QvdError> {
    let mut columns: Vec<Column> = Vec::with_capacity(header.fields.headers.len());
    for field in &header.fields.headers {
        if columns.iter().any(|c| c.name() == field.field_name) {
            return Err(QvdError::DuplicateColumn(field.field_name.clone()));
        }
        let start = field.offset as usize;
        let end = start.checked_add(field.length as usize);
        let slice = end
            .and_then(|e| symbol_buf.get(start..e))
            .ok_or_else(|| {
                QvdError::SymbolTable(format!(
                    "Field '{}' section {}..{} exceeds the {}-byte symbol table",
                    field.field_name,
                    field.offset,
                    field.offset.saturating_add(field.length),
                    symbol_buf.len()
                ))
            })?;
        let decoded = symbols::decode_symbols(slice, &field.field_name)?;
        columns.push(Column::from_symbols(
            field.field_name.clone(),
            decoded,
            field.number_format.clone(),
            field.tags.values.clone(),
        ));
    }
    Ok(columns)
}

/// Check every declared field layout against the record width.
fn validate_layouts(header: &TableHeader) -> Result<(), QvdError> {
    for field in &header.fields.headers {
        index::validate_layout(&field.field_name, layout_of(field), header.record_byte_size)?;
    }
    Ok(())
}

/// Decode `n_records` records from a contiguous index slice.
///
/// `first_record` is the absolute row number of the slice's first record,
/// used for error context in chunked reads.
fn decode_rows(
    index_buf: &[u8],
    fields: &[FieldHeader],
    record_byte_size: usize,
    n_records: usize,
    first_record: u64,
    symbol_counts: &[usize],
) -> Result<Vec<Vec<Option<u32>>>, QvdError> {
    let mut rows = Vec::with_capacity(n_records);
    for r in 0..n_records {
        let record = if record_byte_size == 0 {
            &[][..]
        } else {
            &index_buf[r * record_byte_size..(r + 1) * record_byte_size]
        };
        let mut row = Vec::with_capacity(fields.len());
        for (j, field) in fields.iter().enumerate() {
            row.push(index::decode_field(
                record,
                layout_of(field),
                symbol_counts[j],
                first_record + r as u64,
                &field.field_name,
            )?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Decode a complete QVD image from a byte buffer.
pub fn read_table_bytes(buf: &[u8]) -> Result<Table, QvdError> {
    let (header, header_end) = header::parse_header(buf)?;
    validate_layouts(&header)?;

    let symbol_end = header_end
        .checked_add(header.length as usize)
        .filter(|&e| e <= buf.len())
        .ok_or_else(|| {
            QvdError::Header(format!(
                "Symbol table ({} bytes at {}) extends past the {}-byte file",
                header.length,
                header_end,
                buf.len()
            ))
        })?;
    let columns = decode_columns(&header, &buf[header_end..symbol_end])?;
    let symbol_counts: Vec<usize> = columns.iter().map(|c| c.symbols().len()).collect();

    let record_byte_size = header.record_byte_size as usize;
    let n_records = header.no_of_records as usize;
    let needed = n_records.checked_mul(record_byte_size).ok_or_else(|| {
        QvdError::IndexTable(format!(
            "Index size overflows: {} records of {} bytes",
            n_records, record_byte_size
        ))
    })?;
    if buf.len() - symbol_end < needed {
        return Err(QvdError::IndexTable(format!(
            "Index table has {} bytes, {} records of {} bytes need {}",
            buf.len() - symbol_end,
            n_records,
            record_byte_size,
            needed
        )));
    }

    let rows = decode_rows(
        &buf[symbol_end..symbol_end + needed],
        &header.fields.headers,
        record_byte_size,
        n_records,
        0,
        &symbol_counts,
    )?;
    Ok(Table::from_parts(header.table_name, columns, rows))
}

/// Read a complete table from a byte source.
pub fn read_table<R: Read>(source: &mut R) -> Result<Table, QvdError> {
    let mut buf = Vec::new();
    source
        .read_to_end(&mut buf)
        .map_err(|e| QvdError::Io(format!("Cannot read source: {}", e)))?;
    read_table_bytes(&buf)
}

/// Read a complete table from a `.qvd` file on disk.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Table, QvdError> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| QvdError::Io(format!("Cannot open {}: {}", path.display(), e)))?;
    read_table(&mut file)
}

/// Lazy sequence of row chunks sharing one decoded schema.
///
/// Produced by [`read_chunks`]; yields `ceil(N / chunk_size)` tables of up
/// to `chunk_size` rows each, strictly in ascending row order. Every
/// yielded table owns its own symbol lists and is self-contained.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    source: R,
    header: TableHeader,
    columns: Vec<Column>,
    symbol_counts: Vec<usize>,
    index_start: u64,
    chunk_size: usize,
    next_chunk: usize,
    num_chunks: usize,
}

/// Open a chunked read over a seekable source.
///
/// The header and symbol table are decoded eagerly; only the index table
/// is streamed. Sources that cannot seek fail here with
/// [`QvdError::Unseekable`], before any chunk is produced.
pub fn read_chunks<R: Read + Seek>(
    mut source: R,
    chunk_size: usize,
) -> Result<ChunkedReader<R>, QvdError> {
    if chunk_size == 0 {
        return Err(QvdError::Argument("Chunk size must be at least 1".to_string()));
    }

    // Probe seekability up front; a pipe-backed source fails here.
    let file_size = source
        .seek(SeekFrom::End(0))
        .map_err(|e| QvdError::Unseekable(format!("Source does not support seeking: {}", e)))?;
    source
        .seek(SeekFrom::Start(0))
        .map_err(|e| QvdError::Unseekable(format!("Source does not support seeking: {}", e)))?;

    // Stream the header until the terminator shows up.
    let mut buf: Vec<u8> = Vec::with_capacity(HEADER_READ_CHUNK);
    let header_end = loop {
        if let Some(pos) = header::find_terminator(&buf) {
            break pos + HEADER_TERMINATOR.len();
        }
        if buf.len() >= MAX_HEADER_SIZE {
            return Err(QvdError::Header(format!(
                "Header terminator not found in the first {} bytes",
                buf.len()
            )));
        }
        let mut chunk = [0u8; HEADER_READ_CHUNK];
        let got = source
            .read(&mut chunk)
            .map_err(|e| QvdError::Io(format!("Cannot read header: {}", e)))?;
        if got == 0 {
            return Err(QvdError::Header(
                "Header terminator not found before end of source".to_string(),
            ));
        }
        buf.extend_from_slice(&chunk[..got]);
    };

    let (header, parsed_end) = header::parse_header(&buf[..header_end])?;
    debug_assert_eq!(parsed_end, header_end);
    validate_layouts(&header)?;

    // Load the complete symbol table.
    source
        .seek(SeekFrom::Start(header_end as u64))
        .map_err(|e| QvdError::Io(format!("Cannot seek to symbol table: {}", e)))?;
    let mut symbol_buf = vec![0u8; header.length as usize];
    source
        .read_exact(&mut symbol_buf)
        .map_err(|e| QvdError::Io(format!("Cannot read symbol table: {}", e)))?;
    let columns = decode_columns(&header, &symbol_buf)?;
    let symbol_counts: Vec<usize> = columns.iter().map(|c| c.symbols().len()).collect();

    let index_start = header_end as u64 + header.length;
    let needed = header.no_of_records * header.record_byte_size as u64;
    if file_size < index_start || file_size - index_start < needed {
        return Err(QvdError::IndexTable(format!(
            "Index table has {} bytes, {} records of {} bytes need {}",
            file_size.saturating_sub(index_start),
            header.no_of_records,
            header.record_byte_size,
            needed
        )));
    }

    let n_records = header.no_of_records as usize;
    Ok(ChunkedReader {
        source,
        header,
        columns,
        symbol_counts,
        index_start,
        chunk_size,
        next_chunk: 0,
        num_chunks: n_records.div_ceil(chunk_size),
    })
}

impl<R: Read + Seek> ChunkedReader<R> {
    /// Total number of chunks, available before iteration.
    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    /// Rows in the underlying file.
    pub fn total_rows(&self) -> usize {
        self.header.no_of_records as usize
    }

    fn read_chunk(&mut self, chunk: usize) -> Result<Table, QvdError> {
        let n_total = self.header.no_of_records as usize;
        let start_row = chunk * self.chunk_size;
        let rows_here = self.chunk_size.min(n_total - start_row);
        let record_byte_size = self.header.record_byte_size as usize;

        let buf = if record_byte_size == 0 {
            Vec::new()
        } else {
            let offset = self.index_start + (start_row * record_byte_size) as u64;
            self.source
                .seek(SeekFrom::Start(offset))
                .map_err(|e| QvdError::Io(format!("Cannot seek to chunk {}: {}", chunk, e)))?;
            let mut buf = vec![0u8; rows_here * record_byte_size];
            self.source
                .read_exact(&mut buf)
                .map_err(|e| QvdError::Io(format!("Cannot read chunk {}: {}", chunk, e)))?;
            buf
        };

        let rows = decode_rows(
            &buf,
            &self.header.fields.headers,
            record_byte_size,
            rows_here,
            start_row as u64,
            &self.symbol_counts,
        )?;
        Ok(Table::from_parts(
            self.header.table_name.clone(),
            self.columns.clone(),
            rows,
        ))
    }
}

impl<R: Read + Seek> Iterator for ChunkedReader<R> {
    type Item = Result<Table, QvdError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_chunk >= self.num_chunks {
            return None;
        }
        let chunk = self.next_chunk;
        self.next_chunk += 1;
        Some(self.read_chunk(chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_chunks - self.next_chunk;
        (remaining, Some(remaining))
    }
}

impl<R: Read + Seek> ExactSizeIterator for ChunkedReader<R> {}
