//! QVD file structure constants.
//!
//! Layout values shared by the header, symbol, and index codecs. All
//! multi-byte on-disk values are little-endian.

/// Byte sequence terminating the XML header (`CR LF NUL`). The first byte
/// after the NUL is the first byte of the symbol table.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\0";

/// UTF-8 byte order mark, tolerated at the start of the header.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Upper bound on the header scan; files whose sentinel does not appear
/// within this many bytes are rejected as malformed.
pub const MAX_HEADER_SIZE: usize = 16 * 1024 * 1024;

/// Read granularity while scanning a stream for the header terminator.
pub const HEADER_READ_CHUNK: usize = 8192;

// Symbol record tag bytes (first byte of every symbol-table record)

/// 4-byte little-endian signed integer.
pub const SYM_INT: u8 = 0x01;
/// 8-byte little-endian IEEE 754 double.
pub const SYM_DOUBLE: u8 = 0x02;
/// NUL-terminated UTF-8 string.
pub const SYM_TEXT: u8 = 0x04;
/// 4-byte integer followed by a NUL-terminated display string.
pub const SYM_DUAL_INT: u8 = 0x05;
/// 8-byte double followed by a NUL-terminated display string.
pub const SYM_DUAL_DOUBLE: u8 = 0x06;

/// Widest bit range a single field may occupy in an index record. Wider
/// declarations are rejected as malformed.
pub const MAX_BIT_WIDTH: u32 = 32;

/// QVD serial epoch as (year, month, day): day 0 is 1899-12-30.
pub const EPOCH_YMD: (i32, u32, u32) = (1899, 12, 30);

/// Seconds in one serial day.
pub const SECS_PER_DAY: i64 = 86_400;

/// Milliseconds in one serial day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

// Default display patterns for the interpreted value constructors

/// Default pattern for date duals.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";
/// Default pattern for time duals.
pub const DEFAULT_TIME_FORMAT: &str = "hh:mm:ss";
/// Default pattern for timestamp duals.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "YYYY-MM-DD hh:mm:ss";
/// Default pattern for interval duals.
pub const DEFAULT_INTERVAL_FORMAT: &str = "D hh:mm:ss";
/// Default pattern for money duals.
pub const DEFAULT_MONEY_FORMAT: &str = "#,##0.00";

/// Default `TableName` when neither the table nor the write options name one.
pub const DEFAULT_TABLE_NAME: &str = "Table";

/// Build number stamped into emitted headers.
pub const QV_BUILD_NO: u32 = 50667;
