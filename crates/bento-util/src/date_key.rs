//! Canonical calendar-day key
//!
//! Todos and journal entries are joined on the day they belong to. Every
//! component formats and parses days through [`DateKey`] so the string form
//! (`YYYY-MM-DD`, zero padded) can never drift between collections.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Format used for the canonical string form
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day, serialized as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date key '{value}': expected YYYY-MM-DD")]
pub struct DateKeyError {
    pub value: String,
}

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year/month/day, returning None for impossible dates
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's key according to [`crate::now`]
    pub fn today() -> Self {
        Self(crate::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// First day of the month containing this day
    pub fn month_start(&self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + chrono::Duration::days(days))
    }

    pub fn add_months(&self, months: u32) -> Self {
        Self(self.0.checked_add_months(Months::new(months)).unwrap_or(self.0))
    }

    pub fn sub_months(&self, months: u32) -> Self {
        Self(self.0.checked_sub_months(Months::new(months)).unwrap_or(self.0))
    }

    pub fn same_month(&self, other: &DateKey) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }

    /// Format with an arbitrary chrono pattern (for display only)
    pub fn format(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DateKeyError { value: s.to_string() };

        // chrono accepts signs, padding and short fields; the key format does not
        let bytes = s.as_bytes();
        let digits_at = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
        if bytes.len() != 10
            || bytes[4] != b'-'
            || bytes[7] != b'-'
            || !digits_at(0..4)
            || !digits_at(5..7)
            || !digits_at(8..10)
        {
            return Err(err());
        }

        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| err())
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
