//! Calendar-version labels of the form `yyyy.ww.minor`.
//!
//! `ww` is the ISO week number, zero-padded to two digits. The minor
//! counter restarts at 0 in each new week and increments when a collection
//! is published again within the same week.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};

/// A parsed calendar-version label. Ordering is by year, week, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalVer {
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week, 1 to 53.
    pub week: u32,
    /// Publish counter within the week.
    pub minor: u32,
}

impl CalVer {
    /// The first label of the ISO week containing `now`.
    #[must_use]
    pub fn for_week(now: DateTime<Utc>) -> Self {
        let iso = now.iso_week();
        Self { year: iso.year(), week: iso.week(), minor: 0 }
    }

    /// The label that follows `previous` when publishing at `now`.
    ///
    /// The result is always strictly greater than `previous`, even when the
    /// clock reads a week earlier than the previous label.
    #[must_use]
    pub fn next(previous: Option<Self>, now: DateTime<Utc>) -> Self {
        let current = Self::for_week(now);
        match previous {
            Some(prev) if (prev.year, prev.week) >= (current.year, current.week) => {
                Self { minor: prev.minor + 1, ..prev }
            }
            _ => current,
        }
    }
}

impl fmt::Display for CalVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}.{}", self.year, self.week, self.minor)
    }
}

impl FromStr for CalVer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [year, week, minor] = parts.as_slice() else {
            return Err(format!("expected yyyy.ww.minor, got {s:?}"));
        };
        let year = year.parse().map_err(|_| format!("invalid year in {s:?}"))?;
        let week: u32 = week.parse().map_err(|_| format!("invalid week in {s:?}"))?;
        let minor = minor.parse().map_err(|_| format!("invalid minor in {s:?}"))?;
        if !(1..=53).contains(&week) {
            return Err(format!("week out of range in {s:?}"));
        }
        Ok(Self { year, week, minor })
    }
}

/// Returns the label following `previous` when publishing at `now`.
///
/// A `previous` label that does not parse (such as a draft placeholder) is
/// treated as absent.
#[must_use]
pub fn increment(previous: Option<&str>, now: DateTime<Utc>) -> String {
    let previous = previous.and_then(|label| label.parse::<CalVer>().ok());
    CalVer::next(previous, now).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_publish_starts_the_week_at_zero() {
        assert_eq!(increment(None, day(2026, 2, 18)), "2026.08.0");
    }

    #[test]
    fn same_week_republish_bumps_minor() {
        assert_eq!(increment(Some("2026.08.0"), day(2026, 2, 19)), "2026.08.1");
        assert_eq!(increment(Some("2026.08.9"), day(2026, 2, 19)), "2026.08.10");
    }

    #[test]
    fn new_week_resets_minor() {
        assert_eq!(increment(Some("2026.08.4"), day(2026, 2, 25)), "2026.09.0");
    }

    #[test]
    fn iso_year_boundary_uses_week_year() {
        // 2027-01-01 falls in ISO week 53 of 2026.
        assert_eq!(increment(None, day(2027, 1, 1)), "2026.53.0");
    }

    #[test]
    fn clock_behind_previous_label_still_increases() {
        let next = CalVer::next(Some("2026.30.2".parse().unwrap()), day(2026, 1, 7));
        assert_eq!(next.to_string(), "2026.30.3");
    }

    #[test]
    fn labels_order_by_components() {
        let a: CalVer = "2026.08.9".parse().unwrap();
        let b: CalVer = "2026.08.10".parse().unwrap();
        let c: CalVer = "2026.9.0".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn placeholder_names_do_not_parse() {
        assert!("Draft".parse::<CalVer>().is_err());
        assert!("2026.54.0".parse::<CalVer>().is_err());
        assert_eq!(increment(Some("Draft"), day(2026, 2, 18)), "2026.08.0");
    }
}
