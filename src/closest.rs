//! Selecting the candidate date nearest to a reference date.
//!
//! ```
//! use closest_to::{closest_to, Date};
//!
//! let result = closest_to(
//!     Date::from_ymd_utc(2015, 9, 6),
//!     [Date::from_ymd_utc(2000, 1, 1), Date::from_ymd_utc(2030, 1, 1)],
//! );
//! assert_eq!(result, Some(Date::from_ymd_utc(2030, 1, 1)));
//! ```

use tracing::{debug, trace};

use crate::coerce::to_date;
use crate::types::{Date, DateInput};

/// What the scan does when a candidate coerces to an invalid date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidCandidatePolicy {
    /// The result becomes the invalid date and stays so for the rest of the scan.
    #[default]
    Poison,
    /// Invalid candidates are ignored.
    Skip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClosestOptions {
    pub invalid_candidates: InvalidCandidatePolicy,
}

impl ClosestOptions {
    pub fn skip_invalid() -> Self {
        Self {
            invalid_candidates: InvalidCandidatePolicy::Skip,
        }
    }
}

/// Running state of one scan. `index` is `None` once poisoned.
struct Best {
    index: Option<usize>,
    date: Date,
    distance: f64,
}

enum Outcome {
    InvalidReference,
    Empty,
    Found(Best),
}

fn scan<I>(reference: DateInput, candidates: I, options: &ClosestOptions) -> Outcome
where
    I: IntoIterator,
    I::Item: Into<DateInput>,
{
    let reference = to_date(reference);
    if !reference.is_valid() {
        debug!("reference date is invalid, skipping scan");
        return Outcome::InvalidReference;
    }

    let mut best: Option<Best> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let current = to_date(candidate);

        if !current.is_valid() {
            match options.invalid_candidates {
                InvalidCandidatePolicy::Skip => {
                    trace!(index, "skipping invalid candidate");
                }
                InvalidCandidatePolicy::Poison => {
                    debug!(index, "invalid candidate poisons the result");
                    best = Some(Best {
                        index: None,
                        date: Date::invalid(),
                        distance: f64::NAN,
                    });
                }
            }
            continue;
        }

        let distance = reference.distance(&current);
        // NaN never compares smaller, so a poisoned result is kept
        let adopt = best.as_ref().is_none_or(|b| distance < b.distance);
        if adopt {
            trace!(index, distance, "new closest candidate");
            best = Some(Best {
                index: Some(index),
                date: current,
                distance,
            });
        }
    }

    best.map_or(Outcome::Empty, Outcome::Found)
}

/// Returns the candidate closest in time to `reference`.
///
/// Ties go to the earliest candidate. An invalid reference yields
/// `Some(Date::invalid())` without looking at the candidates, and an empty
/// sequence yields `None`. Any invalid candidate turns the result into
/// `Some(Date::invalid())`; see [`closest_to_with`] to skip them instead.
///
/// An absent collection is passed as an empty iterator, e.g.
/// `maybe_dates.into_iter().flatten()`.
pub fn closest_to<R, I>(reference: R, candidates: I) -> Option<Date>
where
    R: Into<DateInput>,
    I: IntoIterator,
    I::Item: Into<DateInput>,
{
    closest_to_with(reference, candidates, &ClosestOptions::default())
}

pub fn closest_to_with<R, I>(reference: R, candidates: I, options: &ClosestOptions) -> Option<Date>
where
    R: Into<DateInput>,
    I: IntoIterator,
    I::Item: Into<DateInput>,
{
    match scan(reference.into(), candidates, options) {
        Outcome::InvalidReference => Some(Date::invalid()),
        Outcome::Empty => None,
        Outcome::Found(best) => Some(best.date),
    }
}

/// Position of the candidate closest in time to `reference`.
///
/// `None` when there is no candidate, the reference is invalid, or the scan
/// was poisoned by an invalid candidate.
pub fn closest_index_to<R, I>(reference: R, candidates: I) -> Option<usize>
where
    R: Into<DateInput>,
    I: IntoIterator,
    I::Item: Into<DateInput>,
{
    closest_index_to_with(reference, candidates, &ClosestOptions::default())
}

pub fn closest_index_to_with<R, I>(
    reference: R,
    candidates: I,
    options: &ClosestOptions,
) -> Option<usize>
where
    R: Into<DateInput>,
    I: IntoIterator,
    I::Item: Into<DateInput>,
{
    match scan(reference.into(), candidates, options) {
        Outcome::Found(best) => best.index,
        Outcome::InvalidReference | Outcome::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_utc(y, m, d)
    }

    #[test]
    fn picks_nearest_future_date() {
        let result = closest_to(ymd(2015, 9, 6), [ymd(2000, 1, 1), ymd(2030, 1, 1)]);
        assert_eq!(result, Some(ymd(2030, 1, 1)));
    }

    #[test]
    fn picks_nearest_past_date() {
        let result = closest_to(ymd(2015, 9, 6), [ymd(2030, 1, 1), ymd(2015, 1, 1)]);
        assert_eq!(result, Some(ymd(2015, 1, 1)));
    }

    #[test]
    fn tie_keeps_first_candidate() {
        let result = closest_to(ymd(2015, 9, 6), [ymd(2015, 9, 5), ymd(2015, 9, 7)]);
        assert_eq!(result, Some(ymd(2015, 9, 5)));

        let result = closest_to(ymd(2015, 9, 6), [ymd(2015, 9, 7), ymd(2015, 9, 5)]);
        assert_eq!(result, Some(ymd(2015, 9, 7)));
    }

    #[test]
    fn empty_sequence_has_no_answer() {
        assert_eq!(closest_to(ymd(2015, 9, 6), Vec::<Date>::new()), None);
    }

    #[test]
    fn absent_sequence_has_no_answer() {
        let absent: Option<Vec<Date>> = None;
        assert_eq!(closest_to(ymd(2015, 9, 6), absent.into_iter().flatten()), None);
    }

    #[test]
    fn invalid_reference_short_circuits() {
        let result = closest_to(Date::invalid(), [ymd(2000, 1, 1)]);
        assert_eq!(result, Some(Date::invalid()));

        let result = closest_to(f64::NAN, Vec::<Date>::new());
        assert_eq!(result, Some(Date::invalid()));
    }

    #[test]
    fn invalid_candidate_poisons_result() {
        let candidates = [
            DateInput::from(ymd(2000, 1, 1)),
            DateInput::Number(f64::NAN),
            DateInput::from(ymd(2015, 9, 7)),
        ];
        let result = closest_to(ymd(2015, 9, 6), candidates);
        assert_eq!(result, Some(Date::invalid()));
    }

    #[test]
    fn invalid_first_candidate_poisons_result() {
        let result = closest_to(
            ymd(2015, 9, 6),
            [DateInput::Undefined, DateInput::from(ymd(2015, 9, 6))],
        );
        assert_eq!(result, Some(Date::invalid()));
    }

    #[test]
    fn skip_policy_ignores_invalid_candidates() {
        let candidates = vec![
            DateInput::from(ymd(2000, 1, 1)),
            DateInput::Text("garbage".into()),
            DateInput::from(ymd(2015, 9, 7)),
        ];
        let result = closest_to_with(ymd(2015, 9, 6), candidates, &ClosestOptions::skip_invalid());
        assert_eq!(result, Some(ymd(2015, 9, 7)));
    }

    #[test]
    fn skip_policy_all_invalid_has_no_answer() {
        let result = closest_to_with(
            ymd(2015, 9, 6),
            [f64::NAN, f64::INFINITY],
            &ClosestOptions::skip_invalid(),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn mixed_inputs_are_coerced() {
        let reference = ymd(2015, 9, 6).time();
        let candidates = vec![
            DateInput::Text("2000-01-01".into()),
            DateInput::Number(ymd(2016, 1, 1).time()),
            DateInput::from(ymd(2030, 1, 1)),
        ];
        assert_eq!(closest_to(reference, candidates), Some(ymd(2016, 1, 1)));
    }

    #[test]
    fn accepts_set_and_map_values() {
        let set: BTreeSet<i64> = [0, 1_000, 5_000].into_iter().collect();
        assert_eq!(closest_to(1_400_i64, set), Some(Date::from_millis(1_000.0)));

        let map = BTreeMap::from([("a", ymd(2000, 1, 1)), ("b", ymd(2030, 1, 1))]);
        assert_eq!(
            closest_to(ymd(2015, 9, 6), map.values()),
            Some(ymd(2030, 1, 1))
        );
    }

    #[test]
    fn single_candidate_round_trips() {
        let d = Date::from_millis(1_234_567.0);
        assert_eq!(closest_to(0.0, [d]), Some(d));
    }

    #[test]
    fn index_matches_date() {
        let candidates = [ymd(2000, 1, 1), ymd(2030, 1, 1), ymd(2015, 8, 1)];
        assert_eq!(closest_index_to(ymd(2015, 9, 6), candidates), Some(2));
    }

    #[test]
    fn index_none_cases() {
        assert_eq!(closest_index_to(ymd(2015, 9, 6), Vec::<Date>::new()), None);
        assert_eq!(closest_index_to(Date::invalid(), [ymd(2000, 1, 1)]), None);
        let poisoned = [DateInput::from(ymd(2000, 1, 1)), DateInput::Undefined];
        assert_eq!(closest_index_to(ymd(2015, 9, 6), poisoned), None);
    }

    #[test]
    fn index_with_skip_policy() {
        let candidates = [
            DateInput::Undefined,
            DateInput::from(ymd(2000, 1, 1)),
            DateInput::from(ymd(2015, 9, 1)),
        ];
        assert_eq!(
            closest_index_to_with(ymd(2015, 9, 6), candidates, &ClosestOptions::skip_invalid()),
            Some(2)
        );
    }
}
