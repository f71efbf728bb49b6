//! Tax reporting periods.
//!
//! A [`TaxPeriod`] is a (year, month) bucket. Ordering follows the
//! first calendar day of the month, and a period can be anchored to a
//! zoned point in time at its start.

use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::tz::{attach_zone, TzError, CANONICAL_TZ};

/// Earliest year a tax period may reference.
pub const MIN_PERIOD_YEAR: i32 = 1900;

/// Errors from tax-period construction and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The year is before [`MIN_PERIOD_YEAR`].
    #[error("year {0} is before {MIN_PERIOD_YEAR}")]
    YearOutOfRange(i32),
    /// The month is not in `1..=12`.
    #[error("month {0} is not in 1..=12")]
    MonthOutOfRange(u32),
    /// The input is not of the form `YYYY-MM`.
    #[error("invalid tax period '{0}', expected YYYY-MM")]
    InvalidFormat(String),
    /// The period start does not exist as a local time in the zone.
    #[error(transparent)]
    Zone(#[from] TzError),
}

/// A (year, month) tax reporting period.
///
/// # Examples
///
/// ```
/// use rcvkit_core::TaxPeriod;
///
/// let p: TaxPeriod = "2024-03".parse().unwrap();
/// assert_eq!(p.year(), 2024);
/// assert_eq!(p.month(), 3);
/// assert!(p < "2024-04".parse().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxPeriod {
    year: i32,
    month: u32,
}

impl TaxPeriod {
    /// Create a period, validating the year and month ranges.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if year < MIN_PERIOD_YEAR {
            return Err(PeriodError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The first calendar day of the period.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        // Ranges are validated in `new`, so day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated year/month always yields a first day")
    }

    /// Midnight at the start of the period in the canonical zone.
    pub fn start(&self) -> Result<DateTime<Tz>, PeriodError> {
        let naive = self
            .first_day()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid wall-clock time");
        Ok(attach_zone(naive, CANONICAL_TZ)?)
    }

    /// The period a zoned timestamp falls in.
    ///
    /// Chrono can represent dates before [`MIN_PERIOD_YEAR`], so the
    /// year range is re-validated here.
    pub fn from_datetime(dt: &DateTime<Tz>) -> Result<Self, PeriodError> {
        Self::new(dt.year(), dt.month())
    }
}

impl fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TaxPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PeriodError::InvalidFormat(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        Self::new(year, month)
    }
}

impl Serialize for TaxPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaxPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
