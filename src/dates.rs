//! Eight-digit calendar dates and the injectable "today".

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DATE8_FORMAT: &str = "%Y%m%d";

/// A calendar date rendered as `YYYYMMDD`.
///
/// Arithmetic is true calendar-day arithmetic: `20200103 - 7 days` is
/// `20191227`, not the digit-wise `20200096`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date8(NaiveDate);

impl Date8 {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Saturates at the earliest representable date.
    pub fn days_before(&self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    /// `YYYYMMDDHHMMSS` timestamp at midnight, as the news search API expects.
    pub fn midnight_timestamp(&self) -> String {
        format!("{}000000", self)
    }
}

impl fmt::Display for Date8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE8_FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a YYYYMMDD date: {0:?}")]
pub struct Date8ParseError(pub String);

impl FromStr for Date8 {
    type Err = Date8ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            NaiveDate::parse_from_str(trimmed, DATE8_FORMAT)
        } else {
            // Models occasionally answer with ISO dates.
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        };

        parsed.map(Self).map_err(|_| Date8ParseError(s.to_string()))
    }
}

impl Serialize for Date8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of the current processing date.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date8;
}

/// Wall-clock date in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date8 {
        Date8(Local::now().date_naive())
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date8);

impl Clock for FixedClock {
    fn today(&self) -> Date8 {
        self.0
    }
}
