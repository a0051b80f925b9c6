use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A calendar month (`YYYY-MM`), the unit all payroll math runs on.
///
/// Payout months and work months are both `Month`s; a payout month is always
/// one calendar month after the work month it compensates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Error)]
#[error("invalid month (expected YYYY-MM): {0}")]
pub struct ParseMonthError(String);

impl Month {
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Months since year 0, used for ordering and probation arithmetic.
    #[must_use]
    pub const fn index(self) -> i32 {
        self.year * 12 + (self.month as i32 - 1)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    #[must_use]
    pub fn plus_months(self, n: u32) -> Self {
        let idx = self.index() + n as i32;
        Self {
            year: idx.div_euclid(12),
            month: (idx.rem_euclid(12) + 1) as u32,
        }
    }

    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .checked_sub_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    #[must_use]
    pub fn days_in_month(self) -> u32 {
        self.last_day().day()
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| ParseMonthError(s.to_string()))?;
        let year: i32 = y.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        let month: u32 = m.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let m: Month = "2024-06".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 6);
        assert_eq!(m.to_string(), "2024-06");
    }

    #[test]
    fn rejects_garbage() {
        assert!("2024".parse::<Month>().is_err());
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024-00".parse::<Month>().is_err());
        assert!("abcd-ef".parse::<Month>().is_err());
    }

    #[test]
    fn wraps_across_year_boundaries() {
        let dec: Month = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        let jan: Month = "2025-01".parse().unwrap();
        assert_eq!(jan.prev().to_string(), "2024-12");
    }

    #[test]
    fn plus_months_matches_probation_arithmetic() {
        let join: Month = "2024-06".parse().unwrap();
        assert_eq!(join.plus_months(3).to_string(), "2024-09");
        assert_eq!(join.plus_months(7).to_string(), "2025-01");
    }

    #[test]
    fn month_boundaries() {
        let feb: Month = "2024-02".parse().unwrap();
        assert_eq!(feb.days_in_month(), 29);
        assert_eq!(
            feb.last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
