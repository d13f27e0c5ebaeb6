//! Availability filtering and date-level availability.
//!
//! The filter takes the raw candidates of one day and drops the ones that
//! violate the meeting type's minimum notice or collide, once widened by the
//! buffer, with a busy period reported by the remote calendar. It never
//! reorders and never adds.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{MeetingType, SiteConfig};
use crate::slots::CandidateSlot;
use crate::time::{TimeError, TimeWindow};

/// An occupied interval `[start, end)` reported by the remote calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// A bookable slot offered to a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<CandidateSlot> for TimeSlot {
    fn from(slot: CandidateSlot) -> Self {
        Self {
            start_time: slot.start,
            end_time: slot.end,
        }
    }
}

/// Returns true if `[start - buffer, end + buffer)` intersects any busy period.
///
/// A gap of exactly `buffer` between the slot and a busy period is allowed.
pub fn is_slot_busy(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer: Duration,
    busy: &[BusyPeriod],
) -> bool {
    let padded = TimeWindow::new(start, end).extend(buffer);
    busy.iter().any(|b| padded.overlaps(b.start, b.end))
}

/// Returns true if `start` is at least `min_notice` after `now`.
///
/// A notice that runs past the representable range is never met.
pub fn meets_minimum_notice(start: DateTime<Utc>, now: DateTime<Utc>, min_notice: Duration) -> bool {
    now.checked_add_signed(min_notice)
        .is_some_and(|earliest| start >= earliest)
}

/// Removes candidates that violate minimum notice or buffered overlap.
pub fn filter_available(
    candidates: &[CandidateSlot],
    meeting_type: &MeetingType,
    now: DateTime<Utc>,
    busy: &[BusyPeriod],
) -> Vec<TimeSlot> {
    let buffer = meeting_type.buffer();
    let min_notice = meeting_type.min_notice();

    candidates
        .iter()
        .filter(|c| meets_minimum_notice(c.start, now, min_notice))
        .filter(|c| !is_slot_busy(c.start, c.end, buffer, busy))
        .copied()
        .map(TimeSlot::from)
        .collect()
}

/// Whether a calendar day can be offered for booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAvailability {
    /// The calendar date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Day of week, Sunday = 0.
    pub day_of_week: u32,
    pub available: bool,
}

/// Returns true if `date` has a window, has not fully passed, and is within
/// the booking horizon.
pub fn is_date_bookable(
    config: &SiteConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<bool, TimeError> {
    if config.window_for(date.weekday()).is_none() {
        return Ok(false);
    }

    let day = TimeWindow::for_local_date(date, &config.timezone)?;
    if day.end <= now {
        return Ok(false);
    }

    // Past the representable range means no horizon at all.
    let horizon = now.checked_add_signed(Duration::days(i64::from(config.max_booking_days)));
    Ok(horizon.is_none_or(|h| day.start <= h))
}

/// Computes availability for `days` consecutive dates starting at `start`.
pub fn date_availability(
    config: &SiteConfig,
    start: NaiveDate,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Vec<DateAvailability>, TimeError> {
    let mut result = Vec::with_capacity(days as usize);
    let mut date = start;

    for _ in 0..days {
        result.push(DateAvailability {
            date,
            day_of_week: day_of_week(date.weekday()),
            available: is_date_bookable(config, date, now)?,
        });
        date = date.succ_opt().ok_or(TimeError::OutOfRange(date))?;
    }

    Ok(result)
}

/// Sunday-first index for a weekday.
pub fn day_of_week(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}
