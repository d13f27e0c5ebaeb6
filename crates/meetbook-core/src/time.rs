//! Civil time conversion and time windows.
//!
//! All availability is defined in the host's base timezone, while every
//! computed slot is an absolute UTC instant. [`local_to_utc`] is the one
//! place where a calendar date plus a local time-of-day becomes an instant;
//! the slot generator, the day-bounds query, and the booking path all go
//! through it so DST handling cannot diverge between them.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from civil time conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The local time does not exist in the zone and could not be shifted.
    #[error("local time {date} {time} does not exist in {zone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        zone: String,
    },

    /// Date arithmetic overflowed chrono's supported range.
    #[error("date {0} is out of range")]
    OutOfRange(NaiveDate),
}

/// Converts a calendar date and local time-of-day in `tz` into a UTC instant.
///
/// Ambiguous local times (the repeated hour when clocks fall back) resolve to
/// the earlier instant. Local times inside a spring-forward gap are shifted
/// forward by one hour, which is the same instant the wall clock would have
/// shown under the pre-transition offset.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Result<DateTime<Utc>, TimeError> {
    let naive = date.and_time(time);

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TimeError::NonexistentLocalTime {
                date,
                time,
                zone: tz.name().to_string(),
            }),
    }
}

/// A time window over absolute instants.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window from a start time and duration.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Returns the full local day `[00:00, next 00:00)` for `date` in `tz`.
    ///
    /// On DST transition days the window is 23 or 25 hours long.
    pub fn for_local_date(date: NaiveDate, tz: &Tz) -> Result<Self, TimeError> {
        let next = date.succ_opt().ok_or(TimeError::OutOfRange(date))?;
        let start = local_to_utc(date, NaiveTime::MIN, tz)?;
        let end = local_to_utc(next, NaiveTime::MIN, tz)?;
        Ok(Self { start, end })
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if this window intersects `[start, end)`.
    ///
    /// Windows that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Extends the window by the given duration on both ends.
    pub fn extend(&self, duration: Duration) -> Self {
        Self {
            start: self.start - duration,
            end: self.end + duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    mod local_to_utc {
        use super::*;

        #[test]
        fn standard_time() {
            // PST is UTC-8
            let instant = local_to_utc(date(2026, 2, 10), hm(9, 0), &Los_Angeles).unwrap();
            assert_eq!(instant, utc(2026, 2, 10, 17, 0));
        }

        #[test]
        fn daylight_time() {
            // PDT is UTC-7
            let instant = local_to_utc(date(2026, 7, 1), hm(9, 0), &Los_Angeles).unwrap();
            assert_eq!(instant, utc(2026, 7, 1, 16, 0));
        }

        #[test]
        fn spring_forward_gap_shifts_forward() {
            // 2026-03-08 02:30 does not exist in Los Angeles
            let instant = local_to_utc(date(2026, 3, 8), hm(2, 30), &Los_Angeles).unwrap();
            // 03:30 PDT == 10:30 UTC == 02:30 under the old PST offset
            assert_eq!(instant, utc(2026, 3, 8, 10, 30));
        }

        #[test]
        fn fall_back_ambiguity_takes_earliest() {
            // 2026-11-01 01:30 happens twice in Los Angeles
            let instant = local_to_utc(date(2026, 11, 1), hm(1, 30), &Los_Angeles).unwrap();
            // First occurrence is still PDT (UTC-7)
            assert_eq!(instant, utc(2026, 11, 1, 8, 30));
        }

        #[test]
        fn utc_zone_is_identity() {
            let instant = local_to_utc(date(2026, 2, 10), hm(9, 15), &Tz::UTC).unwrap();
            assert_eq!(instant, utc(2026, 2, 10, 9, 15));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let window = TimeWindow::new(utc(2026, 2, 5, 9, 0), utc(2026, 2, 5, 17, 0));
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2026, 2, 5, 17, 0), utc(2026, 2, 5, 9, 0));
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::new(utc(2026, 2, 5, 9, 0), utc(2026, 2, 5, 17, 0));
            assert!(window.contains(utc(2026, 2, 5, 9, 0)));
            assert!(window.contains(utc(2026, 2, 5, 16, 59)));
            assert!(!window.contains(utc(2026, 2, 5, 17, 0)));
            assert!(!window.contains(utc(2026, 2, 5, 8, 59)));
        }

        #[test]
        fn overlaps() {
            let window = TimeWindow::new(utc(2026, 2, 5, 9, 0), utc(2026, 2, 5, 10, 0));

            assert!(window.overlaps(utc(2026, 2, 5, 9, 30), utc(2026, 2, 5, 9, 45)));
            assert!(window.overlaps(utc(2026, 2, 5, 8, 0), utc(2026, 2, 5, 9, 1)));
            assert!(window.overlaps(utc(2026, 2, 5, 8, 0), utc(2026, 2, 5, 11, 0)));

            // Touching endpoints
            assert!(!window.overlaps(utc(2026, 2, 5, 8, 0), utc(2026, 2, 5, 9, 0)));
            assert!(!window.overlaps(utc(2026, 2, 5, 10, 0), utc(2026, 2, 5, 11, 0)));
        }

        #[test]
        fn extend() {
            let window = TimeWindow::new(utc(2026, 2, 5, 10, 0), utc(2026, 2, 5, 12, 0));
            let extended = window.extend(Duration::minutes(15));
            assert_eq!(extended.start, utc(2026, 2, 5, 9, 45));
            assert_eq!(extended.end, utc(2026, 2, 5, 12, 15));
        }

        #[test]
        fn for_local_date_regular_day() {
            let window = TimeWindow::for_local_date(date(2026, 2, 10), &Los_Angeles).unwrap();
            assert_eq!(window.start, utc(2026, 2, 10, 8, 0));
            assert_eq!(window.end, utc(2026, 2, 11, 8, 0));
            assert_eq!(window.duration(), Duration::hours(24));
        }

        #[test]
        fn for_local_date_spring_forward_is_23_hours() {
            let window = TimeWindow::for_local_date(date(2026, 3, 8), &Los_Angeles).unwrap();
            assert_eq!(window.duration(), Duration::hours(23));
        }

        #[test]
        fn for_local_date_fall_back_is_25_hours() {
            let window = TimeWindow::for_local_date(date(2026, 11, 1), &Los_Angeles).unwrap();
            assert_eq!(window.duration(), Duration::hours(25));
        }

        #[test]
        fn serde_roundtrip() {
            let window = TimeWindow::new(utc(2026, 2, 5, 9, 0), utc(2026, 2, 5, 17, 0));
            let json = serde_json::to_string(&window).unwrap();
            let parsed: TimeWindow = serde_json::from_str(&json).unwrap();
            assert_eq!(window, parsed);
        }
    }
}
