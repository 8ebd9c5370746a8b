//! Local calendar primitives: minutes-since-midnight and `YYYY-MM-DD` day keys.
//!
//! The backend sends times as `HH:MM` or `HH:MM:SS` and dates as either a bare
//! `YYYY-MM-DD` or a full ISO timestamp. Only the first 5 characters of a time
//! and the first 10 characters of a date are significant. Everything is
//! converted to integers here, at the boundary, so that no comparison in the
//! engine is ever lexical.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::{Result, ScheduleError};

/// Number of minutes in a (DST-free) local day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A minute offset from local midnight, in `0..=1440`.
///
/// `1440` is only produced as the exclusive end of a projected day; parsing a
/// time string never yields it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Returns `None` when `minutes` is past the end of the day.
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Parse `HH:MM` (anything after the fifth character is ignored).
    ///
    /// # Errors
    /// Returns `ScheduleError::MalformedTime` unless the first five characters
    /// are two digits, a colon and two digits, with hour `< 24` and minute `< 60`.
    pub fn parse(s: &str) -> Result<Self> {
        let malformed = || ScheduleError::MalformedTime(s.to_string());

        let head = s.trim().get(..5).ok_or_else(malformed)?;
        let (hh, mm) = head.split_once(':').ok_or_else(malformed)?;
        let hours = two_digits(hh).ok_or_else(malformed)?;
        let minutes = two_digits(mm).ok_or_else(malformed)?;
        if hours >= 24 || minutes >= 60 {
            return Err(malformed());
        }
        Ok(Self(hours * 60 + minutes))
    }

    /// Minutes from `self` up to `later`, zero if `later` is not after `self`.
    pub fn minutes_until(self, later: Self) -> u16 {
        later.0.saturating_sub(self.0)
    }

    /// Wall-clock time for this minute. The end-of-day sentinel maps to
    /// midnight.
    pub fn to_naive_time(self) -> NaiveTime {
        let minute = u32::from(self.0 % MINUTES_PER_DAY);
        NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for MinuteOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn two_digits(s: &str) -> Option<u16> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// The significant part of a wire date: its first 10 characters.
///
/// No validation happens here; this is what reservations are matched on.
pub fn date_prefix(s: &str) -> &str {
    let s = s.trim();
    s.get(..10).unwrap_or(s)
}

/// Normalize a wire date to a validated `YYYY-MM-DD` key.
///
/// # Errors
/// Returns `ScheduleError::MalformedDate` if the first 10 characters are not a
/// calendar date.
pub fn date_key(s: &str) -> Result<&str> {
    parse_day(s)?;
    Ok(date_prefix(s))
}

/// Combine a wire date and a minute of that day into a local instant.
pub fn local_instant(date: &str, minute: MinuteOfDay) -> Result<NaiveDateTime> {
    Ok(parse_day(date)?.and_time(minute.to_naive_time()))
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_prefix(s), "%Y-%m-%d")
        .map_err(|_| ScheduleError::MalformedDate(s.to_string()))
}
