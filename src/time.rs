//! Millisecond time value arithmetic.
//!
//! A time value is an `f64` count of milliseconds since 1970-01-01T00:00:00Z.
//! NaN marks an invalid time value and propagates through every helper here.
//! Calendar math is proleptic Gregorian on whole days counted from the epoch.

use chrono::{Local, Offset, TimeZone};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Largest magnitude a valid time value may have (±100,000,000 days).
pub const MAX_TIME: f64 = 8.64e15;

// Comfortably past the ±275,760 years MAX_TIME allows; anything beyond
// can only clip to NaN, and rejecting it early keeps day counts small.
const MAX_YEAR: f64 = 400_000.0;

const DAYS_PER_ERA: i64 = 146_097;
// Days from 0000-03-01 to 1970-01-01.
const EPOCH_SHIFT: i64 = 719_468;

/// Days since the epoch of a civil date; `month` is 1-based.
///
/// Years are shifted to start in March so the leap day lands at the end of
/// a 400-year era, which keeps every step a plain integer division.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let march_month = i64::from((month + 9) % 12);
    let day_of_year = (153 * march_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - EPOCH_SHIFT
}

/// Civil `(year, month, day)` for a day count; inverse of [`days_from_civil`].
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let shifted = days + EPOCH_SHIFT;
    let era = shifted.div_euclid(DAYS_PER_ERA);
    let day_of_era = shifted - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let march_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * march_month + 2) / 5 + 1) as u32;
    let month = (if march_month < 10 {
        march_month + 3
    } else {
        march_month - 9
    }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Day count for a date given as possibly unnormalised numbers; `month` is
/// zero-based and may run into adjacent years. NaN for non-finite input or
/// years no time value can reach.
pub fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if !year.is_finite() || !month.is_finite() || !date.is_finite() {
        return f64::NAN;
    }
    let year = year.trunc() + (month.trunc() / 12.0).floor();
    if year.abs() > MAX_YEAR {
        return f64::NAN;
    }
    let month = month.trunc().rem_euclid(12.0) as u32 + 1;
    days_from_civil(year as i64, month, 1) as f64 + date.trunc() - 1.0
}

pub fn make_time(hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    if ![hour, min, sec, ms].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    hour.trunc() * MS_PER_HOUR as f64
        + min.trunc() * MS_PER_MINUTE as f64
        + sec.trunc() * MS_PER_SECOND as f64
        + ms.trunc()
}

pub fn make_date(day: f64, time: f64) -> f64 {
    day * MS_PER_DAY as f64 + time
}

/// Truncates to whole milliseconds; NaN when non-finite or out of range.
pub fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME {
        return f64::NAN;
    }
    // trunc, then + 0.0 folds -0 into +0
    time.trunc() + 0.0
}

/// A valid time value split into UTC calendar fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateFields {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    /// 0 = Sunday
    pub weekday: u32,
}

impl DateFields {
    /// `None` unless `t` is a clipped, valid time value.
    pub fn from_time(t: f64) -> Option<Self> {
        if !t.is_finite() || t.abs() > MAX_TIME {
            return None;
        }
        let t = t as i64;
        let days = t.div_euclid(MS_PER_DAY);
        let in_day = t.rem_euclid(MS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        Some(Self {
            year,
            month,
            day,
            hour: (in_day / MS_PER_HOUR) as u32,
            minute: (in_day % MS_PER_HOUR / MS_PER_MINUTE) as u32,
            second: (in_day % MS_PER_MINUTE / MS_PER_SECOND) as u32,
            millisecond: (in_day % MS_PER_SECOND) as u32,
            weekday: (days + 4).rem_euclid(7) as u32,
        })
    }
}

/// Offset of the host local zone from UTC at `t`, in milliseconds.
pub fn local_offset_ms(t: f64) -> f64 {
    let at_t = if t.is_finite() {
        Local
            .timestamp_millis_opt(t as i64)
            .single()
            .map(|dt| dt.offset().fix().local_minus_utc())
    } else {
        None
    };
    let secs = at_t.unwrap_or_else(|| Local::now().offset().fix().local_minus_utc());
    f64::from(secs) * MS_PER_SECOND as f64
}

/// Converts a local wall-clock time value to UTC.
pub fn utc_time(t: f64) -> f64 {
    t - local_offset_ms(t)
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Renders a time value the way a JS engine prints a number, `NaN` included.
pub fn format_time_value(t: f64) -> String {
    if t.is_nan() {
        return "NaN".to_string();
    }
    if t == 0.0 {
        return "0".to_string();
    }
    if t.is_infinite() {
        return if t > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(t).to_string()
}

/// `YYYY-MM-DDTHH:mm:ss.sssZ`, with a signed six-digit year outside
/// 0..=9999. `None` for an invalid time value.
pub fn format_iso_string(t: f64) -> Option<String> {
    let f = DateFields::from_time(t)?;
    let year = match f.year {
        y @ 0..=9999 => format!("{y:04}"),
        y if y > 0 => format!("+{y:06}"),
        y => format!("-{:06}", y.unsigned_abs()),
    };
    Some(format!(
        "{year}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        f.month, f.day, f.hour, f.minute, f.second, f.millisecond
    ))
}

/// Parses the ISO-8601 subset and the `toString` form; NaN otherwise.
pub fn parse_date_string(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return f64::NAN;
    }
    parse_iso_date(s)
        .or_else(|| parse_tostring_format(s))
        .unwrap_or(f64::NAN)
}

/// Byte cursor over an ASCII date string.
struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.s.len()
    }

    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digits(&mut self, n: usize) -> Option<i64> {
        let chunk = self.s.get(self.pos..self.pos + n)?;
        if !chunk.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.pos += n;
        chunk.parse().ok()
    }

    /// Fractional seconds of any length, read as milliseconds.
    fn fraction_ms(&mut self) -> Option<i64> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let frac = &self.s[start..self.pos];
        if frac.is_empty() {
            return None;
        }
        format!("{:0<3}", &frac[..frac.len().min(3)]).parse().ok()
    }
}

fn valid_clock(hour: i64, minute: i64, second: i64) -> bool {
    (0..24).contains(&hour) && (0..60).contains(&minute) && (0..60).contains(&second)
}

/// UTC offset in minutes; the colon between hours and minutes is optional
/// but must be followed by minutes when present.
fn parse_offset_minutes(c: &mut Cursor<'_>) -> Option<i64> {
    let sign = if c.eat(b'+') {
        1
    } else if c.eat(b'-') {
        -1
    } else {
        return None;
    };
    let hours = c.digits(2)?;
    let minutes = if c.eat(b':') {
        c.digits(2)?
    } else if c.at_end() {
        0
    } else {
        c.digits(2)?
    };
    if !c.at_end() || hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

fn parse_iso_date(s: &str) -> Option<f64> {
    let mut c = Cursor::new(s);

    let year = if c.eat(b'+') {
        c.digits(6)?
    } else if c.eat(b'-') {
        let y = c.digits(6)?;
        // -000000 is not a valid extended year
        if y == 0 {
            return None;
        }
        -y
    } else {
        c.digits(4)?
    };

    let mut month = 1;
    let mut day_of_month = 1;
    if c.eat(b'-') {
        month = c.digits(2)?;
        if !(1..=12).contains(&month) {
            return None;
        }
        if c.eat(b'-') {
            day_of_month = c.digits(2)?;
            if !(1..=31).contains(&day_of_month) {
                return None;
            }
        }
    }
    let d = make_day(year as f64, (month - 1) as f64, day_of_month as f64);

    if c.at_end() {
        // date-only forms are UTC
        return Some(time_clip(make_date(d, 0.0)));
    }

    if !(c.eat(b'T') || c.eat(b't')) {
        return None;
    }
    let hour = c.digits(2)?;
    if !c.eat(b':') {
        return None;
    }
    let minute = c.digits(2)?;
    let (second, ms) = if c.eat(b':') {
        let sec = c.digits(2)?;
        let ms = if c.eat(b'.') { c.fraction_ms()? } else { 0 };
        (sec, ms)
    } else {
        (0, 0)
    };
    // 24:00 is accepted as the end of the day
    let end_of_day = hour == 24 && (minute, second, ms) == (0, 0, 0);
    if !end_of_day && !valid_clock(hour, minute, second) {
        return None;
    }
    let dt = make_date(
        d,
        make_time(hour as f64, minute as f64, second as f64, ms as f64),
    );

    if c.at_end() {
        // date-time forms without a designator are local time
        return Some(time_clip(utc_time(dt)));
    }
    if c.eat(b'Z') || c.eat(b'z') {
        return c.at_end().then(|| time_clip(dt));
    }
    let offset = parse_offset_minutes(&mut c)?;
    Some(time_clip(dt - (offset * MS_PER_MINUTE) as f64))
}

// "Wed Jan 29 2026 12:34:56 GMT+0100 (CET)", zone suffix optional.
fn parse_tostring_format(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() < 5 || !DAY_NAMES.contains(&parts[0]) {
        return None;
    }
    let month = MONTH_NAMES.iter().position(|&m| m == parts[1])?;
    let day_of_month: u32 = parts[2].parse().ok()?;
    let year: i64 = parts[3].parse().ok()?;
    if !(1..=31).contains(&day_of_month) || year.unsigned_abs() > MAX_YEAR as u64 {
        return None;
    }

    let hms: Vec<i64> = parts[4]
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    let &[hour, min, sec] = hms.as_slice() else {
        return None;
    };
    if !valid_clock(hour, min, sec) {
        return None;
    }

    let d = make_day(year as f64, month as f64, f64::from(day_of_month));
    let dt = make_date(d, make_time(hour as f64, min as f64, sec as f64, 0.0));

    let Some(tz) = parts.get(5).and_then(|p| p.strip_prefix("GMT")) else {
        return Some(time_clip(utc_time(dt)));
    };
    if tz.is_empty() {
        return Some(time_clip(dt));
    }
    let offset = parse_offset_minutes(&mut Cursor::new(tz))?;
    Some(time_clip(dt - (offset * MS_PER_MINUTE) as f64))
}
