//! The working-day calendar: weekdays plus alternating Saturdays.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::Month;

/// Whether a date counts as a working day.
///
/// Sundays never work; Monday through Friday always do. A Saturday works
/// iff its 0-based ordinal among the month's Saturdays is odd — the 2nd and
/// 4th Saturdays work, the 1st/3rd/5th rest. The parity is a fixed company
/// rule carried over verbatim; it is not configurable.
#[must_use]
pub fn is_working_day(date: NaiveDate) -> bool {
    match date.weekday() {
        Weekday::Sun => false,
        Weekday::Sat => saturday_ordinal(date) % 2 == 1,
        _ => true,
    }
}

/// 0-based index of this Saturday among the month's Saturdays.
fn saturday_ordinal(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7
}

/// Working days across the whole month.
#[must_use]
pub fn standard_working_days(month: Month) -> u32 {
    working_days_between(month.first_day(), month.last_day())
}

/// Working days in the inclusive range; 0 when inverted.
#[must_use]
pub fn working_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| is_working_day(*d))
        .count() as u32
}
