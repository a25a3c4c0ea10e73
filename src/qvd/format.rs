//! Number formats and display-text formatting.
//!
//! Every field header carries a `<NumberFormat>` block declaring how the
//! column's numeric values are meant to be read: as plain numbers, dates,
//! times, timestamps, intervals, or money. The declared kind never changes
//! how values are stored — dates and friends are serial numbers on the QVD
//! epoch (day 0 = 1899-12-30, times as day fractions) — it only drives how
//! display text is generated at the boundary.
//!
//! The pattern grammar covers `YYYY YY MM M DD D hh mm ss fff` plus literal
//! separators for calendar formats, and `#`/`0` masks with `,` grouping and
//! `.` decimals plus literal currency prefix/suffix for money formats.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::qvd::constants::{EPOCH_YMD, MILLIS_PER_DAY};

/// Declared interpretation of a column's numeric values.
///
/// `Fix` (fixed-decimal) appears in files written by QlikView itself;
/// unrecognized type strings parse as `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Ascii,
    Integer,
    Real,
    Fix,
    Money,
    Date,
    Time,
    Timestamp,
    Interval,
    Unknown,
}

impl FormatKind {
    /// The on-disk `Type` element value for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Ascii => "ASCII",
            FormatKind::Integer => "INTEGER",
            FormatKind::Real => "REAL",
            FormatKind::Fix => "FIX",
            FormatKind::Money => "MONEY",
            FormatKind::Date => "DATE",
            FormatKind::Time => "TIME",
            FormatKind::Timestamp => "TIMESTAMP",
            FormatKind::Interval => "INTERVAL",
            FormatKind::Unknown => "UNKNOWN",
        }
    }

    /// Map an on-disk `Type` value to a kind; anything unrecognized
    /// (including an empty element) is `Unknown`.
    pub fn from_name(name: &str) -> FormatKind {
        match name {
            "ASCII" => FormatKind::Ascii,
            "INTEGER" => FormatKind::Integer,
            "REAL" => FormatKind::Real,
            "FIX" => FormatKind::Fix,
            "MONEY" => FormatKind::Money,
            "DATE" => FormatKind::Date,
            "TIME" => FormatKind::Time,
            "TIMESTAMP" => FormatKind::Timestamp,
            "INTERVAL" => FormatKind::Interval,
            _ => FormatKind::Unknown,
        }
    }
}

impl Default for FormatKind {
    fn default() -> Self {
        FormatKind::Unknown
    }
}

impl Serialize for FormatKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FormatKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FormatKind::from_name(&name))
    }
}

/// The `<NumberFormat>` block of a field header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Declared kind (`Type` element).
    #[serde(rename = "Type", default)]
    pub kind: FormatKind,
    /// Declared decimal count.
    #[serde(rename = "nDec", default)]
    pub n_dec: u32,
    /// Whether thousands grouping applies (0 or 1).
    #[serde(rename = "UseThou", default)]
    pub use_thou: u32,
    /// Format pattern string (e.g. `DD.MM.YYYY`).
    #[serde(rename = "Fmt", default)]
    pub fmt: String,
    /// Decimal separator.
    #[serde(rename = "Dec", default)]
    pub dec: String,
    /// Thousands separator.
    #[serde(rename = "Thou", default)]
    pub thou: String,
}

impl NumberFormat {
    /// A format block declaring only a kind.
    pub fn of_kind(kind: FormatKind) -> NumberFormat {
        NumberFormat {
            kind,
            ..NumberFormat::default()
        }
    }
}

fn epoch_date() -> NaiveDate {
    // Components are compile-time constants; this cannot fail.
    NaiveDate::from_ymd_opt(EPOCH_YMD.0, EPOCH_YMD.1, EPOCH_YMD.2).unwrap()
}

/// Serial day number for a calendar date.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - epoch_date()).num_days() as f64
}

/// Day fraction for a time of day.
pub fn time_to_serial(time: NaiveTime) -> f64 {
    let millis = time.num_seconds_from_midnight() as i64 * 1000
        + (time.nanosecond() / 1_000_000) as i64;
    millis as f64 / MILLIS_PER_DAY as f64
}

/// Serial number for a timestamp: whole days plus day fraction.
pub fn datetime_to_serial(ts: NaiveDateTime) -> f64 {
    date_to_serial(ts.date()) + time_to_serial(ts.time())
}

/// Serial days for a signed duration.
pub fn duration_to_serial(dur: Duration) -> f64 {
    dur.num_milliseconds() as f64 / MILLIS_PER_DAY as f64
}

/// Convert a serial number back to a calendar timestamp, rounding the day
/// fraction to the nearest millisecond. Returns `None` outside chrono's
/// representable range.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let mut days = serial.floor() as i64;
    let mut millis = ((serial - serial.floor()) * MILLIS_PER_DAY as f64).round() as i64;
    if millis >= MILLIS_PER_DAY {
        days += 1;
        millis -= MILLIS_PER_DAY;
    }
    let date = epoch_date().checked_add_signed(Duration::days(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        ((millis % 1000) * 1_000_000) as u32,
    )?;
    Some(NaiveDateTime::new(date, time))
}

/// One element of a tokenized calendar pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    Month2,
    Month1,
    Day2,
    Day1,
    Hour,
    Minute,
    Second,
    Millis,
    Literal(char),
}

/// Greedy longest-match tokenizer for the calendar pattern grammar.
fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let (token, consumed) = match c {
            'Y' => {
                if run >= 4 {
                    (Token::Year4, 4)
                } else {
                    (Token::Year2, run.min(2))
                }
            }
            'M' => {
                if run >= 2 {
                    (Token::Month2, 2)
                } else {
                    (Token::Month1, 1)
                }
            }
            'D' => {
                if run >= 2 {
                    (Token::Day2, 2)
                } else {
                    (Token::Day1, 1)
                }
            }
            'h' => (Token::Hour, run.min(2)),
            'm' => (Token::Minute, run.min(2)),
            's' => (Token::Second, run.min(2)),
            'f' => (Token::Millis, run.min(3)),
            other => (Token::Literal(other), 1),
        };
        tokens.push(token);
        i += consumed;
    }
    tokens
}

/// Render a date/time/timestamp serial with a calendar pattern.
///
/// Serials outside the representable calendar range fall back to the plain
/// numeric rendering.
///
/// # Examples
///
/// ```
/// use qvd::qvd::format::format_serial;
///
/// // serial 2.0 is 1900-01-01 on the QVD epoch
/// assert_eq!(format_serial(2.0, "DD.MM.YYYY"), "01.01.1900");
/// assert_eq!(format_serial(2.75, "hh:mm:ss"), "18:00:00");
/// ```
pub fn format_serial(serial: f64, pattern: &str) -> String {
    let ts = match serial_to_datetime(serial) {
        Some(ts) => ts,
        None => return format!("{}", serial),
    };
    let mut out = String::with_capacity(pattern.len() + 4);
    for token in tokenize(pattern) {
        match token {
            Token::Year4 => out.push_str(&format!("{:04}", ts.year())),
            Token::Year2 => out.push_str(&format!("{:02}", ts.year().rem_euclid(100))),
            Token::Month2 => out.push_str(&format!("{:02}", ts.month())),
            Token::Month1 => out.push_str(&ts.month().to_string()),
            Token::Day2 => out.push_str(&format!("{:02}", ts.day())),
            Token::Day1 => out.push_str(&ts.day().to_string()),
            Token::Hour => out.push_str(&format!("{:02}", ts.hour())),
            Token::Minute => out.push_str(&format!("{:02}", ts.minute())),
            Token::Second => out.push_str(&format!("{:02}", ts.second())),
            Token::Millis => {
                let millis = (ts.time().nanosecond() / 1_000_000) % 1000;
                out.push_str(&format!("{:03}", millis));
            }
            Token::Literal(c) => out.push(c),
        }
    }
    out
}

/// Render an interval serial (signed days) with a calendar pattern.
///
/// `D`/`DD` renders whole days; when the pattern has no day token, `hh`
/// renders total hours instead of the 0–23 remainder.
pub fn format_interval(serial: f64, pattern: &str) -> String {
    if !serial.is_finite() {
        return format!("{}", serial);
    }
    let total_millis = (serial.abs() * MILLIS_PER_DAY as f64).round() as i64;
    let days = total_millis / MILLIS_PER_DAY;
    let total_hours = total_millis / 3_600_000;
    let tokens = tokenize(pattern);
    let has_day = tokens
        .iter()
        .any(|t| matches!(t, Token::Day1 | Token::Day2));

    let mut out = String::with_capacity(pattern.len() + 4);
    if serial < 0.0 && total_millis > 0 {
        out.push('-');
    }
    for token in tokens {
        match token {
            Token::Day1 => out.push_str(&days.to_string()),
            Token::Day2 => out.push_str(&format!("{:02}", days)),
            Token::Hour => {
                let hours = if has_day { total_hours % 24 } else { total_hours };
                out.push_str(&format!("{:02}", hours));
            }
            Token::Minute => out.push_str(&format!("{:02}", (total_millis / 60_000) % 60)),
            Token::Second => out.push_str(&format!("{:02}", (total_millis / 1000) % 60)),
            Token::Millis => out.push_str(&format!("{:03}", total_millis % 1000)),
            // Year/month tokens have no meaning for intervals; echo them through
            Token::Year4 | Token::Year2 | Token::Month2 | Token::Month1 => {}
            Token::Literal(c) => out.push(c),
        }
    }
    out
}

/// Parsed money pattern: literal prefix, digit masks, literal suffix.
struct MoneyPattern {
    prefix: String,
    min_int_digits: usize,
    grouped: bool,
    min_frac_digits: usize,
    max_frac_digits: usize,
    suffix: String,
}

fn parse_money_pattern(pattern: &str) -> MoneyPattern {
    let chars: Vec<char> = pattern.chars().collect();
    let mask_start = chars
        .iter()
        .position(|&c| c == '#' || c == '0')
        .unwrap_or(chars.len());
    let mask_end = chars[mask_start..]
        .iter()
        .position(|&c| !matches!(c, '#' | '0' | ',' | '.'))
        .map(|p| mask_start + p)
        .unwrap_or(chars.len());

    let prefix: String = chars[..mask_start].iter().collect();
    let suffix: String = chars[mask_end..].iter().collect();
    let mask = &chars[mask_start..mask_end];

    let dot = mask.iter().position(|&c| c == '.');
    let (int_mask, frac_mask) = match dot {
        Some(p) => (&mask[..p], &mask[p + 1..]),
        None => (mask, &[] as &[char]),
    };

    MoneyPattern {
        prefix,
        min_int_digits: int_mask.iter().filter(|&&c| c == '0').count(),
        grouped: int_mask.contains(&','),
        min_frac_digits: frac_mask.iter().filter(|&&c| c == '0').count(),
        max_frac_digits: frac_mask.iter().filter(|&&c| c == '0' || c == '#').count(),
        suffix,
    }
}

/// Render a money value with a `#`/`0` mask pattern.
///
/// `dec` and `thou` are the separator strings to emit for the pattern's
/// `.` and `,` positions.
///
/// # Examples
///
/// ```
/// use qvd::qvd::format::format_money;
///
/// assert_eq!(format_money(1234.5, "$#,##0.00", ".", ","), "$1,234.50");
/// assert_eq!(format_money(-2.25, "#,##0.00 kr", ",", "."), "-2,25 kr");
/// assert_eq!(format_money(7.0, "#,##0.##", ".", ","), "7");
/// ```
pub fn format_money(value: f64, pattern: &str, dec: &str, thou: &str) -> String {
    let p = parse_money_pattern(pattern);

    let negative = value < 0.0;
    let rounded = format!("{:.*}", p.max_frac_digits, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded, String::new()),
    };

    let mut int_digits = int_part;
    while int_digits.len() < p.min_int_digits {
        int_digits.insert(0, '0');
    }
    if p.grouped {
        int_digits = group_thousands(&int_digits, thou);
    }

    let mut frac_digits = frac_part;
    while frac_digits.len() > p.min_frac_digits && frac_digits.ends_with('0') {
        frac_digits.pop();
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&p.prefix);
    out.push_str(&int_digits);
    if !frac_digits.is_empty() {
        out.push_str(dec);
        out.push_str(&frac_digits);
    }
    out.push_str(&p.suffix);
    out
}

fn group_thousands(digits: &str, thou: &str) -> String {
    let bytes: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(digits.len() + 4);
    for (i, c) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push_str(thou);
        }
        out.push(*c);
    }
    out
}
