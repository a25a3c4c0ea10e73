//! Chunked-read tests over on-disk fixtures.

use std::fs::File;

use qvd::qvd::reader::{read_chunks, read_file};
use qvd::qvd::table::Table;
use qvd::qvd::value::Value;
use qvd::qvd::writer::{write_file, WriteOptions};
use tempfile::NamedTempFile;

/// Build a 1000-row, two-column fixture on disk.
fn fixture() -> NamedTempFile {
    let ids: Vec<Value> = (0..1000).map(Value::Int).collect();
    let labels: Vec<Value> = (0..1000)
        .map(|i| {
            if i % 10 == 0 {
                Value::Null
            } else {
                Value::Text(format!("row {}", i % 37))
            }
        })
        .collect();
    let table = Table::from_mapping(vec![
        ("Id".to_string(), ids),
        ("Label".to_string(), labels),
    ])
    .unwrap();

    let tmp = NamedTempFile::new().unwrap();
    write_file(tmp.path(), &table, &WriteOptions::default()).unwrap();
    tmp
}

#[test]
fn test_chunk_count_known_before_iteration() {
    let tmp = fixture();
    let chunks = read_chunks(File::open(tmp.path()).unwrap(), 256).unwrap();
    assert_eq!(chunks.num_chunks(), 4);
    assert_eq!(chunks.total_rows(), 1000);
    assert_eq!(chunks.len(), 4);
}

#[test]
fn test_chunk_sizes_and_order() {
    let tmp = fixture();
    let chunks = read_chunks(File::open(tmp.path()).unwrap(), 256).unwrap();
    let tables: Vec<Table> = chunks.map(|c| c.unwrap()).collect();
    assert_eq!(tables.len(), 4);
    assert_eq!(tables[0].row_count(), 256);
    assert_eq!(tables[1].row_count(), 256);
    assert_eq!(tables[2].row_count(), 256);
    assert_eq!(tables[3].row_count(), 232);

    // strictly ascending row order across chunks
    assert_eq!(tables[0].get(0, "Id").unwrap(), Value::Int(0));
    assert_eq!(tables[1].get(0, "Id").unwrap(), Value::Int(256));
    assert_eq!(tables[3].get(231, "Id").unwrap(), Value::Int(999));
}

#[test]
fn test_concatenated_chunks_equal_whole_read() {
    let tmp = fixture();
    let whole = read_file(tmp.path()).unwrap();

    let chunks = read_chunks(File::open(tmp.path()).unwrap(), 256).unwrap();
    let mut rebuilt: Option<Table> = None;
    for chunk in chunks {
        let chunk = chunk.unwrap();
        rebuilt = Some(match rebuilt {
            Some(acc) => acc.concat(&chunk).unwrap(),
            None => chunk,
        });
    }
    assert_eq!(rebuilt.unwrap(), whole);
}

#[test]
fn test_chunk_size_larger_than_table() {
    let tmp = fixture();
    let mut chunks = read_chunks(File::open(tmp.path()).unwrap(), 5000).unwrap();
    assert_eq!(chunks.num_chunks(), 1);
    let only = chunks.next().unwrap().unwrap();
    assert_eq!(only.row_count(), 1000);
    assert!(chunks.next().is_none());
}

#[test]
fn test_chunks_share_schema_but_own_symbols() {
    let tmp = fixture();
    let chunks = read_chunks(File::open(tmp.path()).unwrap(), 400).unwrap();
    let tables: Vec<Table> = chunks.map(|c| c.unwrap()).collect();
    for table in &tables {
        assert_eq!(table.column_names(), vec!["Id", "Label"]);
    }
    // each chunk is self-contained: dropping one leaves others intact
    let first = tables[0].clone();
    drop(tables);
    assert_eq!(first.get(0, "Id").unwrap(), Value::Int(0));
}

#[test]
fn test_zero_row_file_yields_no_chunks() {
    let table = Table::from_mapping(vec![("A".to_string(), Vec::new())]).unwrap();
    let tmp = NamedTempFile::new().unwrap();
    write_file(tmp.path(), &table, &WriteOptions::default()).unwrap();

    let mut chunks = read_chunks(File::open(tmp.path()).unwrap(), 16).unwrap();
    assert_eq!(chunks.num_chunks(), 0);
    assert!(chunks.next().is_none());
}
