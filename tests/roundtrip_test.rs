//! Write/read round-trip tests over the full codec stack.

use qvd::qvd::format::{FormatKind, NumberFormat};
use qvd::qvd::header::parse_header;
use qvd::qvd::reader::{read_file, read_table_bytes};
use qvd::qvd::table::Table;
use qvd::qvd::value::Value;
use qvd::qvd::writer::{write_file, write_table_bytes, WriteOptions};
use tempfile::NamedTempFile;

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|&v| Value::Int(v)).collect()
}

fn round_trip(table: &Table) -> Table {
    let bytes = write_table_bytes(table, &WriteOptions::default()).unwrap();
    read_table_bytes(&bytes).unwrap()
}

#[test]
fn test_minimal_single_integer_column() {
    let table = Table::from_mapping(vec![("A".to_string(), ints(&[1, 2, 3]))]).unwrap();
    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();

    let (header, _) = parse_header(&bytes).unwrap();
    assert_eq!(header.no_of_records, 3);
    assert_eq!(header.record_byte_size, 1);
    assert_eq!(header.fields.headers[0].bit_width, 2);
    assert_eq!(header.fields.headers[0].bias, 0);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back.shape(), (3, 1));
    assert_eq!(back.column_values("A").unwrap(), ints(&[1, 2, 3]));
}

#[test]
fn test_null_column_bias_and_raw_codes() {
    let table = Table::from_mapping(vec![(
        "A".to_string(),
        vec![Value::Int(10), Value::Null, Value::Int(20)],
    )])
    .unwrap();
    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();

    let (header, header_end) = parse_header(&bytes).unwrap();
    let field = &header.fields.headers[0];
    assert_eq!(field.bit_width, 2);
    assert_eq!(field.bias, -1);
    // raw codes per record: 1 -> 10, 0 -> NULL, 2 -> 20
    let index_start = header_end + header.length as usize;
    assert_eq!(&bytes[index_start..], &[1, 0, 2]);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(
        back.column_values("A").unwrap(),
        vec![Value::Int(10), Value::Null, Value::Int(20)]
    );
}

#[test]
fn test_dual_integer_column_dedups_symbols() {
    let table = Table::from_mapping(vec![(
        "Day".to_string(),
        vec![
            Value::DualInt(1, "Mon".into()),
            Value::DualInt(2, "Tue".into()),
            Value::DualInt(1, "Mon".into()),
        ],
    )])
    .unwrap();
    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();

    let (header, _) = parse_header(&bytes).unwrap();
    assert_eq!(header.fields.headers[0].no_of_symbols, 2);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back, table);
}

#[test]
fn test_mixed_variant_column_round_trips_exact_tags() {
    let table = Table::from_mapping(vec![(
        "M".to_string(),
        vec![Value::Int(1), Value::Text("x".into())],
    )])
    .unwrap();
    let back = round_trip(&table);
    assert_eq!(
        back.column_values("M").unwrap(),
        vec![Value::Int(1), Value::Text("x".into())]
    );
}

#[test]
fn test_round_trip_preserves_awkward_doubles_and_strings() {
    let table = Table::from_mapping(vec![
        (
            "D".to_string(),
            vec![
                Value::Double(0.0),
                Value::Double(-0.0),
                Value::Double(f64::NAN),
                Value::Double(f64::INFINITY),
            ],
        ),
        (
            "S".to_string(),
            vec![
                Value::Text(String::new()),
                Value::Text("æøå 日本語".into()),
                Value::Text("tab\tand spaces".into()),
                Value::Null,
            ],
        ),
    ])
    .unwrap();
    let back = round_trip(&table);
    // bitwise double equality keeps -0.0 and NaN distinct symbols
    assert_eq!(back, table);
}

#[test]
fn test_multi_column_bit_packing() {
    // widths 3 (4 symbols + null), 0 (single symbol), 4 (9 symbols)
    let a: Vec<Value> = (0..9)
        .map(|i| {
            if i == 4 {
                Value::Null
            } else {
                Value::Int(i % 5)
            }
        })
        .collect();
    let b = vec![Value::Text("const".into()); 9];
    let c: Vec<Value> = (0..9).map(|i| Value::Int(i * 11)).collect();
    let table = Table::from_mapping(vec![
        ("A".to_string(), a.clone()),
        ("B".to_string(), b.clone()),
        ("C".to_string(), c.clone()),
    ])
    .unwrap();

    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();
    let (header, _) = parse_header(&bytes).unwrap();
    let fields = &header.fields.headers;
    assert_eq!(fields[0].bit_width, 3);
    assert_eq!(fields[0].bit_offset, 0);
    assert_eq!(fields[1].bit_width, 0);
    assert_eq!(fields[2].bit_offset, 3);
    assert_eq!(fields[2].bit_width, 4);
    assert_eq!(header.record_byte_size, 1);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back.column_values("A").unwrap(), a);
    assert_eq!(back.column_values("B").unwrap(), b);
    assert_eq!(back.column_values("C").unwrap(), c);
}

#[test]
fn test_reencode_is_idempotent() {
    let table = Table::from_mapping(vec![
        ("K".to_string(), ints(&[5, 5, 1, 9, 9, 9])),
        (
            "V".to_string(),
            vec![
                Value::DualDouble(1.5, "1½".into()),
                Value::Null,
                Value::Text("x".into()),
                Value::Int(-3),
                Value::Double(2.25),
                Value::Null,
            ],
        ),
    ])
    .unwrap();
    let first = write_table_bytes(&table, &WriteOptions::default()).unwrap();
    let reread = read_table_bytes(&first).unwrap();
    let second = write_table_bytes(&reread, &WriteOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(read_table_bytes(&second).unwrap(), reread);
}

#[test]
fn test_round_trip_through_file_on_disk() {
    let table = Table::from_mapping(vec![
        ("Id".to_string(), ints(&[1, 2, 3, 4])),
        (
            "Name".to_string(),
            vec![
                Value::Text("a".into()),
                Value::Text("b".into()),
                Value::Null,
                Value::Text("a".into()),
            ],
        ),
    ])
    .unwrap();

    let tmp = NamedTempFile::new().unwrap();
    write_file(tmp.path(), &table, &WriteOptions::default()).unwrap();
    let back = read_file(tmp.path()).unwrap();
    assert_eq!(back, table);
}

#[test]
fn test_empty_table_round_trips() {
    let table = Table::new("Empty");
    let back = round_trip(&table);
    assert_eq!(back.shape(), (0, 0));
}

#[test]
fn test_zero_row_table_with_columns() {
    let table = Table::from_mapping(vec![("A".to_string(), Vec::new())]).unwrap();
    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();
    let (header, _) = parse_header(&bytes).unwrap();
    assert_eq!(header.no_of_records, 0);
    assert_eq!(header.record_byte_size, 0);
    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back.shape(), (0, 1));
    assert_eq!(back.column_names(), vec!["A"]);
}

#[test]
fn test_number_format_and_tags_survive_round_trip() {
    let mut table = Table::from_mapping(vec![(
        "When".to_string(),
        vec![Value::DualDouble(45292.0, "2024-01-01".into())],
    )])
    .unwrap();
    let mut nf = NumberFormat::of_kind(FormatKind::Date);
    nf.fmt = "YYYY-MM-DD".to_string();
    table.set_column_format("When", nf.clone()).unwrap();
    table
        .set_column_tags("When", vec!["$date".to_string(), "$numeric".to_string()])
        .unwrap();

    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();
    let (header, _) = parse_header(&bytes).unwrap();
    assert_eq!(header.fields.headers[0].number_format, nf);
    assert_eq!(header.fields.headers[0].tags.values, vec!["$date", "$numeric"]);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back.columns()[0].number_format().kind, FormatKind::Date);
    assert_eq!(back.columns()[0].tags(), &["$date", "$numeric"]);
}

#[test]
fn test_money_formatter_option_regenerates_displays() {
    let mut table = Table::from_mapping(vec![(
        "Price".to_string(),
        vec![
            Value::DualDouble(1234.5, "1234.5".into()),
            Value::DualDouble(-1.75, "-1.75".into()),
        ],
    )])
    .unwrap();
    table
        .set_column_format("Price", NumberFormat::of_kind(FormatKind::Money))
        .unwrap();

    let options = WriteOptions {
        money_format: Some("$#,##0.00".to_string()),
        ..WriteOptions::default()
    };
    let bytes = write_table_bytes(&table, &options).unwrap();
    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(
        back.column_values("Price").unwrap(),
        vec![
            Value::DualDouble(1234.5, "$1,234.50".into()),
            Value::DualDouble(-1.75, "-$1.75".into()),
        ]
    );
}

#[test]
fn test_interval_formatter_option() {
    let mut table = Table::from_mapping(vec![(
        "Dur".to_string(),
        vec![Value::DualDouble(1.5, "raw".into())],
    )])
    .unwrap();
    table
        .set_column_format("Dur", NumberFormat::of_kind(FormatKind::Interval))
        .unwrap();

    let options = WriteOptions {
        interval_format: Some("D hh:mm".to_string()),
        ..WriteOptions::default()
    };
    let back = read_table_bytes(&write_table_bytes(&table, &options).unwrap()).unwrap();
    assert_eq!(
        back.column_values("Dur").unwrap(),
        vec![Value::DualDouble(1.5, "1 12:00".into())]
    );
}

#[test]
fn test_many_distinct_symbols_cross_byte_records() {
    // 1000 distinct ints force a 10-bit field, straddling byte boundaries
    let values: Vec<Value> = (0..1000).map(Value::Int).collect();
    let table = Table::from_mapping(vec![
        ("A".to_string(), values.clone()),
        ("B".to_string(), values.iter().rev().cloned().collect()),
    ])
    .unwrap();
    let bytes = write_table_bytes(&table, &WriteOptions::default()).unwrap();
    let (header, _) = parse_header(&bytes).unwrap();
    assert_eq!(header.fields.headers[0].bit_width, 10);
    assert_eq!(header.fields.headers[1].bit_offset, 10);
    assert_eq!(header.record_byte_size, 3);

    let back = read_table_bytes(&bytes).unwrap();
    assert_eq!(back, table);
}
