//! Best-effort conversion of loosely-typed input into a [`Date`].

use tracing::debug;

use crate::time;
use crate::types::{Date, DateInput};

/// Coerces `input` into a [`Date`]; never fails.
///
/// Numbers are epoch milliseconds, text goes through the date-string parser,
/// `null` is the epoch and booleans are 0 or 1 ms. `undefined` and anything
/// unparseable become the invalid-date sentinel.
pub fn to_date(input: impl Into<DateInput>) -> Date {
    match input.into() {
        DateInput::Date(d) => d,
        DateInput::Number(n) => Date::from_millis(n),
        DateInput::Text(s) => {
            let t = time::parse_date_string(&s);
            if t.is_nan() {
                debug!(input = %s, "date string not recognised");
            }
            Date::from_millis(t)
        }
        DateInput::Bool(b) => Date::from_millis(if b { 1.0 } else { 0.0 }),
        DateInput::Null => Date::from_millis(0.0),
        DateInput::Undefined => Date::invalid(),
    }
}
