//! Hex dump formatting utilities.
//!
//! Helpers for rendering file sections (header, symbol table, index table)
//! as traditional hex dumps with offset columns and an ASCII sidebar.

use std::fmt::Write;

/// Format a byte offset as "decimal (0xhex)".
pub fn format_offset(offset: u64) -> String {
    format!("{} (0x{:x})", offset, offset)
}

/// Format bytes as space-separated hex pairs (e.g. "4a 2f 00 ff").
pub fn format_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produce a standard hex dump of `data`, offsetting the address column by
/// `base_offset` so dumps of mid-file sections show file positions.
///
/// Each line is an offset column, two 8-byte groups rendered through
/// [`format_bytes`], and an ASCII sidebar:
/// ```text
/// 00000000  xx xx xx xx xx xx xx xx  xx xx xx xx xx xx xx xx  |................|
/// ```
pub fn hex_dump(data: &[u8], base_offset: u64) -> String {
    let mut out = String::with_capacity(data.len() * 4);

    for (line_no, chunk) in data.chunks(16).enumerate() {
        if line_no > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:08x}  ", base_offset + (line_no * 16) as u64);

        let (left, right) = chunk.split_at(chunk.len().min(8));
        let _ = write!(
            out,
            "{:<23}  {:<23}",
            format_bytes(left),
            format_bytes(right)
        );

        out.push_str("  |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                out.push(*byte as char);
            } else {
                out.push('.');
            }
        }
        for _ in chunk.len()..16 {
            out.push(' ');
        }
        out.push('|');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(255), "255 (0xff)");
        assert_eq!(format_offset(0), "0 (0x0)");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(&[0x4a, 0x2f, 0x00, 0xff]), "4a 2f 00 ff");
        assert_eq!(format_bytes(&[]), "");
        assert_eq!(format_bytes(&[0x00]), "00");
    }

    #[test]
    fn test_hex_dump_full_line() {
        let data: Vec<u8> = (0..16).collect();
        let output = hex_dump(&data, 0);
        assert!(output.starts_with("00000000  "));
        assert!(output.contains("00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f"));
    }

    #[test]
    fn test_hex_dump_partial_line_and_base_offset() {
        let output = hex_dump(b"Hello", 0x200);
        assert!(output.starts_with("00000200  "));
        assert!(output.contains("48 65 6c 6c 6f"));
        assert!(output.contains("|Hello"));
    }

    #[test]
    fn test_hex_dump_composes_format_bytes_groups() {
        // a 10-byte dump splits into an 8-byte and a 2-byte group
        let data: Vec<u8> = (0x10..0x1a).collect();
        let output = hex_dump(&data, 0);
        assert!(output.contains(&format_bytes(&data[..8])));
        assert!(output.contains(&format_bytes(&data[8..])));
    }

    #[test]
    fn test_hex_dump_nonprintable_bytes() {
        let output = hex_dump(&[0x00, 0x1f, 0x7f, 0xff], 0);
        assert!(output.contains("|...."));
    }
}
