//! Typed value model for QVD cells.
//!
//! A QVD cell is one of five on-disk variants (integer, double, string, and
//! the two dual forms carrying both a number and a display text) or NULL,
//! which is never stored in the symbol table. Higher-level interpretations
//! (dates, times, intervals, money) are not distinct storage types; they are
//! dual values whose meaning comes from the column's number format.
//!
//! Equality and hashing are exact: doubles compare by bit pattern so that
//! `-0.0`, `+0.0`, and distinct NaN payloads stay distinguishable in the
//! symbol dictionary across a round trip.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::qvd::constants::{
    DEFAULT_DATE_FORMAT, DEFAULT_INTERVAL_FORMAT, DEFAULT_MONEY_FORMAT, DEFAULT_TIMESTAMP_FORMAT,
    DEFAULT_TIME_FORMAT,
};
use crate::qvd::format;

/// A single cell value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent cell. Encoded out-of-band in the index table, never as a symbol.
    Null,
    /// Signed 32-bit integer.
    Int(i32),
    /// IEEE 754 double.
    Double(f64),
    /// String without the on-disk NUL terminator.
    Text(String),
    /// Integer plus display text.
    DualInt(i32, String),
    /// Double plus display text.
    DualDouble(f64, String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The numeric projection used for comparison and filtering.
    ///
    /// Numeric kinds yield their numeric component; `Text` and `Null` have
    /// no calculation value.
    ///
    /// # Examples
    ///
    /// ```
    /// use qvd::qvd::value::Value;
    ///
    /// assert_eq!(Value::Int(7).calc(), Some(7.0));
    /// assert_eq!(Value::DualInt(3, "Wed".into()).calc(), Some(3.0));
    /// assert_eq!(Value::Text("x".into()).calc(), None);
    /// assert_eq!(Value::Null.calc(), None);
    /// ```
    pub fn calc(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::DualInt(i, _) => Some(*i as f64),
            Value::DualDouble(d, _) => Some(*d),
            Value::Text(_) | Value::Null => None,
        }
    }

    /// The display text: the dual string component where present, otherwise
    /// a canonical rendering of the numeric component. NULL renders empty.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Double(d) => Cow::Owned(format_double(*d)),
            Value::Text(s) | Value::DualInt(_, s) | Value::DualDouble(_, s) => Cow::Borrowed(s),
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::DualInt(_, _) => "dual-int",
            Value::DualDouble(_, _) => "dual-double",
        }
    }

    /// Total order used by [`Table::sort_by`](crate::qvd::table::Table::sort_by)
    /// and predicates.
    ///
    /// `Null` sorts before any non-null value. When both sides carry a
    /// calculation value the comparison is numeric ascending, with NaN
    /// greater than any number and ties broken by display text. Otherwise
    /// the comparison falls back to lexical display order.
    pub fn cmp_order(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => match (self.calc(), other.calc()) {
                (Some(a), Some(b)) => {
                    cmp_numeric(a, b).then_with(|| self.display().cmp(&other.display()))
                }
                _ => self.display().cmp(&other.display()),
            },
        }
    }

    /// Build a date dual from a calendar date using the QVD epoch
    /// (serial day 0 = 1899-12-30).
    pub fn from_date(date: NaiveDate) -> Value {
        let serial = format::date_to_serial(date);
        Value::DualDouble(serial, format::format_serial(serial, DEFAULT_DATE_FORMAT))
    }

    /// Build a time dual (fraction of a day).
    pub fn from_time(time: NaiveTime) -> Value {
        let serial = format::time_to_serial(time);
        Value::DualDouble(serial, format::format_serial(serial, DEFAULT_TIME_FORMAT))
    }

    /// Build a timestamp dual (whole days plus day fraction).
    pub fn from_timestamp(ts: NaiveDateTime) -> Value {
        let serial = format::datetime_to_serial(ts);
        Value::DualDouble(serial, format::format_serial(serial, DEFAULT_TIMESTAMP_FORMAT))
    }

    /// Build an interval dual from a signed duration (serial days).
    pub fn from_interval(dur: Duration) -> Value {
        let serial = format::duration_to_serial(dur);
        Value::DualDouble(serial, format::format_interval(serial, DEFAULT_INTERVAL_FORMAT))
    }

    /// Build a money dual with the default `#,##0.00` pattern.
    pub fn money(amount: f64) -> Value {
        Value::DualDouble(
            amount,
            format::format_money(amount, DEFAULT_MONEY_FORMAT, ".", ","),
        )
    }
}

/// Canonical text for a double: integral values drop the fraction.
fn format_double(d: f64) -> String {
    format!("{}", d)
}

/// Numeric order with NaN greater than any number.
fn cmp_numeric(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::DualInt(a, s), Value::DualInt(b, t)) => a == b && s == t,
            (Value::DualDouble(a, s), Value::DualDouble(b, t)) => {
                a.to_bits() == b.to_bits() && s == t
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::Double(d) => {
                state.write_u8(2);
                d.to_bits().hash(state);
            }
            Value::Text(s) => {
                state.write_u8(4);
                s.hash(state);
            }
            Value::DualInt(i, s) => {
                state.write_u8(5);
                i.hash(state);
                s.hash(state);
            }
            Value::DualDouble(d, s) => {
                state.write_u8(6);
                d.to_bits().hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    /// 64-bit integers that fit the signed 32-bit range stay integers;
    /// wider values are widened to `Double` rather than failing.
    fn from(v: i64) -> Value {
        match i32::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(v as f64),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Value {
        Value::from(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        match i32::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(v as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Double(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Double(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        if v {
            Value::DualInt(1, "true".to_string())
        } else {
            Value::DualInt(0, "false".to_string())
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
