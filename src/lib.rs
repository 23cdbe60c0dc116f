//! Find the date in a collection that lies closest to a reference date.
//!
//! Inputs are coerced leniently ([`DateInput`]) and failures surface as the
//! invalid-date sentinel ([`Date::invalid`]) rather than as errors.

pub mod closest;
pub mod coerce;
pub mod error;
pub mod time;
pub mod types;

pub use closest::{
    ClosestOptions, InvalidCandidatePolicy, closest_index_to, closest_index_to_with, closest_to,
    closest_to_with,
};
pub use coerce::to_date;
pub use error::DateParseError;
pub use types::{Date, DateInput};
