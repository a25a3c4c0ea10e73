//! Column-major symbol table codec.
//!
//! Each column owns a contiguous byte slice of the symbol table holding its
//! distinct values as type-tagged records: a one-byte tag followed by a
//! fixed-width little-endian number, a NUL-terminated UTF-8 string, or both
//! (the dual forms). The record sequence is exhausted against the slice;
//! a trailing partial record is a decode error.
//!
//! Symbols keep their on-disk order — the code stored in index rows is the
//! 0-based position in this sequence plus the field's bias.

use byteorder::{ByteOrder, LittleEndian};

use crate::qvd::constants::{SYM_DOUBLE, SYM_DUAL_DOUBLE, SYM_DUAL_INT, SYM_INT, SYM_TEXT};
use crate::qvd::value::Value;
use crate::QvdError;

/// Decode one column's symbol section.
///
/// `buf` must be exactly the field's declared `[Offset, Offset + Length)`
/// slice; `field_name` is used for error context only.
pub fn decode_symbols(buf: &[u8], field_name: &str) -> Result<Vec<Value>, QvdError> {
    let mut symbols = Vec::new();
    let mut pos = 0usize;

    while pos < buf.len() {
        let tag = buf[pos];
        let record_start = pos;
        pos += 1;
        let value = match tag {
            SYM_INT => {
                let bytes = take(buf, pos, 4, field_name, record_start)?;
                pos += 4;
                Value::Int(LittleEndian::read_i32(bytes))
            }
            SYM_DOUBLE => {
                let bytes = take(buf, pos, 8, field_name, record_start)?;
                pos += 8;
                Value::Double(LittleEndian::read_f64(bytes))
            }
            SYM_TEXT => {
                let (text, next) = read_cstr(buf, pos, field_name, record_start)?;
                pos = next;
                Value::Text(text)
            }
            SYM_DUAL_INT => {
                let bytes = take(buf, pos, 4, field_name, record_start)?;
                let num = LittleEndian::read_i32(bytes);
                let (text, next) = read_cstr(buf, pos + 4, field_name, record_start)?;
                pos = next;
                Value::DualInt(num, text)
            }
            SYM_DUAL_DOUBLE => {
                let bytes = take(buf, pos, 8, field_name, record_start)?;
                let num = LittleEndian::read_f64(bytes);
                let (text, next) = read_cstr(buf, pos + 8, field_name, record_start)?;
                pos = next;
                Value::DualDouble(num, text)
            }
            other => {
                return Err(QvdError::SymbolTable(format!(
                    "Unknown symbol tag 0x{:02x} in field '{}' at byte {}",
                    other, field_name, record_start
                )))
            }
        };
        symbols.push(value);
    }

    Ok(symbols)
}

/// Encode a column's symbols with the tightest tag for each variant.
///
/// Dual values always keep their dual tag even when the display text could
/// be re-derived; downstream consumers rely on the tag to tell interpreted
/// numerics (dates, intervals) from raw ones. `Null` never appears in a
/// symbol list and is rejected.
pub fn encode_symbols(symbols: &[Value], field_name: &str) -> Result<Vec<u8>, QvdError> {
    let mut out = Vec::new();
    for value in symbols {
        match value {
            Value::Int(i) => {
                out.push(SYM_INT);
                let mut bytes = [0u8; 4];
                LittleEndian::write_i32(&mut bytes, *i);
                out.extend_from_slice(&bytes);
            }
            Value::Double(d) => {
                out.push(SYM_DOUBLE);
                let mut bytes = [0u8; 8];
                LittleEndian::write_f64(&mut bytes, *d);
                out.extend_from_slice(&bytes);
            }
            Value::Text(s) => {
                out.push(SYM_TEXT);
                push_cstr(&mut out, s, field_name)?;
            }
            Value::DualInt(i, s) => {
                out.push(SYM_DUAL_INT);
                let mut bytes = [0u8; 4];
                LittleEndian::write_i32(&mut bytes, *i);
                out.extend_from_slice(&bytes);
                push_cstr(&mut out, s, field_name)?;
            }
            Value::DualDouble(d, s) => {
                out.push(SYM_DUAL_DOUBLE);
                let mut bytes = [0u8; 8];
                LittleEndian::write_f64(&mut bytes, *d);
                out.extend_from_slice(&bytes);
                push_cstr(&mut out, s, field_name)?;
            }
            Value::Null => {
                return Err(QvdError::Unsupported(format!(
                    "NULL cannot be encoded as a symbol in field '{}'",
                    field_name
                )))
            }
        }
    }
    Ok(out)
}

fn take<'a>(
    buf: &'a [u8],
    pos: usize,
    len: usize,
    field_name: &str,
    record_start: usize,
) -> Result<&'a [u8], QvdError> {
    buf.get(pos..pos + len).ok_or_else(|| {
        QvdError::SymbolTable(format!(
            "Truncated symbol record in field '{}' at byte {}",
            field_name, record_start
        ))
    })
}

fn read_cstr(
    buf: &[u8],
    pos: usize,
    field_name: &str,
    record_start: usize,
) -> Result<(String, usize), QvdError> {
    let rel = buf[pos..].iter().position(|&b| b == 0).ok_or_else(|| {
        QvdError::SymbolTable(format!(
            "Unterminated string in field '{}' at byte {}",
            field_name, record_start
        ))
    })?;
    let text = String::from_utf8_lossy(&buf[pos..pos + rel]).into_owned();
    Ok((text, pos + rel + 1))
}

fn push_cstr(out: &mut Vec<u8>, s: &str, field_name: &str) -> Result<(), QvdError> {
    if s.as_bytes().contains(&0) {
        return Err(QvdError::Unsupported(format!(
            "String containing NUL cannot be encoded in field '{}'",
            field_name
        )));
    }
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_int_record() {
        let buf = [SYM_INT, 0x2A, 0x00, 0x00, 0x00];
        assert_eq!(decode_symbols(&buf, "A").unwrap(), vec![Value::Int(42)]);
    }

    #[test]
    fn test_decode_double_record() {
        let mut buf = vec![SYM_DOUBLE];
        buf.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(decode_symbols(&buf, "A").unwrap(), vec![Value::Double(1.5)]);
    }

    #[test]
    fn test_decode_text_and_dual_records() {
        let mut buf = vec![SYM_TEXT];
        buf.extend_from_slice(b"abc\0");
        buf.push(SYM_DUAL_INT);
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(b"Mon\0");
        buf.push(SYM_DUAL_DOUBLE);
        buf.extend_from_slice(&2.5f64.to_le_bytes());
        buf.extend_from_slice(b"x\0");
        let symbols = decode_symbols(&buf, "A").unwrap();
        assert_eq!(
            symbols,
            vec![
                Value::Text("abc".into()),
                Value::DualInt(1, "Mon".into()),
                Value::DualDouble(2.5, "x".into()),
            ]
        );
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let err = decode_symbols(&[0x03, 0x00], "A").unwrap_err();
        assert!(matches!(err, QvdError::SymbolTable(_)));
        assert!(err.to_string().contains("0x03"));
    }

    #[test]
    fn test_decode_rejects_truncated_numeric() {
        let err = decode_symbols(&[SYM_INT, 0x01, 0x02], "A").unwrap_err();
        assert!(err.to_string().contains("Truncated"));
    }

    #[test]
    fn test_decode_rejects_unterminated_string() {
        let err = decode_symbols(&[SYM_TEXT, b'h', b'i'], "A").unwrap_err();
        assert!(err.to_string().contains("Unterminated"));
    }

    #[test]
    fn test_encode_decode_round_trip_preserves_duals() {
        let symbols = vec![
            Value::Int(-7),
            Value::Double(f64::NAN),
            Value::Text("plain".into()),
            Value::DualInt(3, "Wed".into()),
            Value::DualDouble(45901.0, "2025-09-01".into()),
        ];
        let encoded = encode_symbols(&symbols, "A").unwrap();
        let decoded = decode_symbols(&encoded, "A").unwrap();
        assert_eq!(decoded, symbols);
    }

    #[test]
    fn test_encode_rejects_null() {
        let err = encode_symbols(&[Value::Null], "A").unwrap_err();
        assert!(matches!(err, QvdError::Unsupported(_)));
    }

    #[test]
    fn test_empty_section_decodes_to_no_symbols() {
        assert!(decode_symbols(&[], "A").unwrap().is_empty());
    }
}
