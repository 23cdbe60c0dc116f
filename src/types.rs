use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::DateParseError;
use crate::time;

/// An instant stored as a millisecond time value.
///
/// A NaN time value is the invalid-date sentinel. Two invalid dates compare
/// equal to each other so that results can be asserted with `==`.
#[derive(Clone, Copy)]
pub struct Date {
    time: f64,
}

impl Date {
    /// A date at `ms` milliseconds from the epoch, clipped to the valid range.
    pub fn from_millis(ms: f64) -> Self {
        Self {
            time: time::time_clip(ms),
        }
    }

    pub fn invalid() -> Self {
        Self { time: f64::NAN }
    }

    /// Midnight UTC on the given calendar day; `month` is 1-based.
    pub fn from_ymd_utc(year: i32, month: u32, day: u32) -> Self {
        let d = time::make_day(f64::from(year), f64::from(month) - 1.0, f64::from(day));
        Self::from_millis(time::make_date(d, 0.0))
    }

    /// Midnight in the host local zone on the given calendar day; `month` is 1-based.
    pub fn from_ymd_local(year: i32, month: u32, day: u32) -> Self {
        let d = time::make_day(f64::from(year), f64::from(month) - 1.0, f64::from(day));
        Self::from_millis(time::utc_time(time::make_date(d, 0.0)))
    }

    pub fn is_valid(&self) -> bool {
        !self.time.is_nan()
    }

    /// The raw time value; NaN for an invalid date.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.is_valid().then_some(self.time as i64)
    }

    /// Absolute distance in milliseconds; NaN if either side is invalid.
    pub fn distance(&self, other: &Date) -> f64 {
        (self.time - other.time).abs()
    }

    pub fn to_chrono(&self) -> Option<DateTime<Utc>> {
        self.timestamp_millis()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn to_iso_string(&self) -> Option<String> {
        time::format_iso_string(self.time)
    }
}

const INVALID_DATE: &str = "Invalid Date";

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time || (self.time.is_nan() && other.time.is_nan())
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.time.is_nan() && other.time.is_nan() {
            return Some(Ordering::Equal);
        }
        self.time.partial_cmp(&other.time)
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(iso) => write!(f, "Date({iso})"),
            None => write!(f, "Date(Invalid)"),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(iso) => f.write_str(&iso),
            None => f.write_str(INVALID_DATE),
        }
    }
}

impl FromStr for Date {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = time::parse_date_string(s);
        if t.is_nan() {
            return Err(DateParseError::new(s));
        }
        Ok(Self { time: t })
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Date {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::from_millis(dt.timestamp_millis() as f64)
    }
}

/// A loosely-typed value that can be coerced into a [`Date`].
#[derive(Clone, Debug, PartialEq)]
pub enum DateInput {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(Date),
}

impl From<f64> for DateInput {
    fn from(n: f64) -> Self {
        DateInput::Number(n)
    }
}

impl From<i64> for DateInput {
    fn from(n: i64) -> Self {
        DateInput::Number(n as f64)
    }
}

impl From<bool> for DateInput {
    fn from(b: bool) -> Self {
        DateInput::Bool(b)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl From<Date> for DateInput {
    fn from(d: Date) -> Self {
        DateInput::Date(d)
    }
}

impl From<&Date> for DateInput {
    fn from(d: &Date) -> Self {
        DateInput::Date(*d)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(dt: DateTime<Tz>) -> Self {
        DateInput::Date(dt.into())
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(v: Option<T>) -> Self {
        v.map_or(DateInput::Undefined, Into::into)
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInput::Undefined => write!(f, "undefined"),
            DateInput::Null => write!(f, "null"),
            DateInput::Bool(b) => write!(f, "{b}"),
            DateInput::Number(n) => write!(f, "{}", time::format_time_value(*n)),
            DateInput::Text(s) => write!(f, "{s:?}"),
            DateInput::Date(d) => write!(f, "{d}"),
        }
    }
}
