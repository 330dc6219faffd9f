//! Date range selection.
//!
//! A range is either one of the named presets, resolved against "today", or an
//! explicit pair of ISO dates. In a query string both share the `date` field:
//! presets by name (`last6Months`), custom ranges as `2024-01-01--2024-03-31`.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the two dates of a custom range in a query string.
pub const CUSTOM_RANGE_SEPARATOR: &str = "--";

/// Errors produced when reading a date range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("unknown date range: {0}")]
    Unknown(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("date range starts after it ends: {from} > {to}")]
    Reversed { from: NaiveDate, to: NaiveDate },
}

/// Named presets offered in the date range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamedDateRange {
    Last7Days,
    Last1Month,
    Last2Months,
    Last3Months,
    Last6Months,
    LastYear,
    AllTimes,
}

impl NamedDateRange {
    pub const ALL: [NamedDateRange; 7] = [
        NamedDateRange::Last7Days,
        NamedDateRange::Last1Month,
        NamedDateRange::Last2Months,
        NamedDateRange::Last3Months,
        NamedDateRange::Last6Months,
        NamedDateRange::LastYear,
        NamedDateRange::AllTimes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamedDateRange::Last7Days => "last7Days",
            NamedDateRange::Last1Month => "last1Month",
            NamedDateRange::Last2Months => "last2Months",
            NamedDateRange::Last3Months => "last3Months",
            NamedDateRange::Last6Months => "last6Months",
            NamedDateRange::LastYear => "lastYear",
            NamedDateRange::AllTimes => "allTimes",
        }
    }

    /// Resolve to absolute dates.
    ///
    /// `today` is the upper bound of every preset. `earliest` is the lower bound
    /// of `allTimes`, and the fallback when a preset underflows the calendar.
    pub fn resolve(self, today: NaiveDate, earliest: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = match self {
            NamedDateRange::Last7Days => today.checked_sub_days(Days::new(7)),
            NamedDateRange::Last1Month => today.checked_sub_months(Months::new(1)),
            NamedDateRange::Last2Months => today.checked_sub_months(Months::new(2)),
            NamedDateRange::Last3Months => today.checked_sub_months(Months::new(3)),
            NamedDateRange::Last6Months => today.checked_sub_months(Months::new(6)),
            NamedDateRange::LastYear => today.checked_sub_months(Months::new(12)),
            NamedDateRange::AllTimes => Some(earliest),
        };
        (from.unwrap_or(earliest), today)
    }
}

impl fmt::Display for NamedDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedDateRange {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedDateRange::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| DateRangeError::Unknown(s.to_string()))
    }
}

/// A date range filter: a named preset or a custom `{from, to}` pair, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRange {
    Named(NamedDateRange),
    Custom { from: NaiveDate, to: NaiveDate },
}

impl DateRange {
    /// Build a custom range, rejecting `from > to`.
    pub fn custom(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Reversed { from, to });
        }
        Ok(DateRange::Custom { from, to })
    }

    /// Absolute `(from, to)` dates; custom ranges pass through unchanged.
    pub fn resolve(&self, today: NaiveDate, earliest: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            DateRange::Named(named) => named.resolve(today, earliest),
            DateRange::Custom { from, to } => (from, to),
        }
    }
}

impl From<NamedDateRange> for DateRange {
    fn from(named: NamedDateRange) -> Self {
        DateRange::Named(named)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Named(named) => write!(f, "{}", named),
            DateRange::Custom { from, to } => {
                write!(f, "{}{}{}", from, CUSTOM_RANGE_SEPARATOR, to)
            }
        }
    }
}

impl FromStr for DateRange {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((from, to)) = s.split_once(CUSTOM_RANGE_SEPARATOR) else {
            return s.parse::<NamedDateRange>().map(DateRange::Named);
        };
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        DateRange::custom(from, to)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DateRangeError::InvalidDate(s.to_string()))
}
