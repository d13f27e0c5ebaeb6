//! Candidate slot generation.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{MeetingType, SiteConfig};
use crate::time::{TimeError, local_to_utc};

/// Spacing between consecutive candidate start times.
pub const SLOT_INTERVAL_MINUTES: i64 = 15;

/// A raw candidate interval before any busy-period filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CandidateSlot {
    /// Creates a candidate of `duration` starting at `start`.
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }
}

/// Generates the ordered candidates for `date` and `meeting_type`.
///
/// Candidates start every [`SLOT_INTERVAL_MINUTES`] from the local window
/// start and are emitted while `start + duration <= window_end`. A weekday
/// without a configured window yields an empty list.
pub fn generate_candidates(
    config: &SiteConfig,
    date: NaiveDate,
    meeting_type: &MeetingType,
) -> Result<Vec<CandidateSlot>, TimeError> {
    let Some(window) = config.window_for(date.weekday()) else {
        return Ok(Vec::new());
    };

    let window_start = local_to_utc(date, window.start, &config.timezone)?;
    let window_end = local_to_utc(date, window.end, &config.timezone)?;

    let duration = meeting_type.duration();
    let step = Duration::minutes(SLOT_INTERVAL_MINUTES);

    let mut candidates = Vec::new();
    let mut cursor = window_start;
    while cursor + duration <= window_end {
        candidates.push(CandidateSlot::new(cursor, duration));
        cursor += step;
    }

    tracing::trace!(
        date = %date,
        meeting_type = %meeting_type.slug,
        count = candidates.len(),
        "generated candidate slots"
    );

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AvailabilityWindow, WeeklyAvailability};
    use chrono::{NaiveTime, TimeZone, Weekday};
    use chrono_tz::America::Los_Angeles;
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn monday_config(tz: Tz, start: NaiveTime, end: NaiveTime) -> SiteConfig {
        SiteConfig::new(tz).with_availability(
            WeeklyAvailability::default().with_day(Weekday::Mon, AvailabilityWindow::new(start, end)),
        )
    }

    #[test]
    fn thirty_minute_slots_in_utc_window() {
        let config = monday_config(Tz::UTC, hm(9, 0), hm(17, 0));
        let mt = MeetingType::new("30", "Half hour", 30);

        // 2026-02-09 is a Monday
        let slots = generate_candidates(&config, date(2026, 2, 9), &mt).unwrap();

        // 09:00 .. 16:30 every 15 minutes
        assert_eq!(slots.len(), 31);
        assert_eq!(slots[0].start, utc(2026, 2, 9, 9, 0));
        assert_eq!(slots[0].end, utc(2026, 2, 9, 9, 30));
        assert_eq!(slots[1].start, utc(2026, 2, 9, 9, 15));
        assert_eq!(slots.last().unwrap().start, utc(2026, 2, 9, 16, 30));
        assert_eq!(slots.last().unwrap().end, utc(2026, 2, 9, 17, 0));
    }

    #[test]
    fn window_converted_from_base_timezone() {
        let config = monday_config(Los_Angeles, hm(9, 0), hm(10, 0));
        let mt = MeetingType::new("60", "Hour", 60);

        let slots = generate_candidates(&config, date(2026, 2, 9), &mt).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, utc(2026, 2, 9, 17, 0));
        assert_eq!(slots[0].end, utc(2026, 2, 9, 18, 0));
    }

    #[test]
    fn closed_day_is_empty() {
        let config = monday_config(Tz::UTC, hm(9, 0), hm(17, 0));
        let mt = MeetingType::new("30", "Half hour", 30);

        // Tuesday
        let slots = generate_candidates(&config, date(2026, 2, 10), &mt).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn duration_longer_than_window_is_empty() {
        let config = monday_config(Tz::UTC, hm(9, 0), hm(9, 45));
        let mt = MeetingType::new("60", "Hour", 60);

        let slots = generate_candidates(&config, date(2026, 2, 9), &mt).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn stops_at_first_overshoot_with_odd_window_end() {
        let config = monday_config(Tz::UTC, hm(9, 0), hm(10, 10));
        let mt = MeetingType::new("30", "Half hour", 30);

        let slots = generate_candidates(&config, date(2026, 2, 9), &mt).unwrap();
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![
                utc(2026, 2, 9, 9, 0),
                utc(2026, 2, 9, 9, 15),
                utc(2026, 2, 9, 9, 30),
            ]
        );
    }

    #[test]
    fn dst_gap_window_start_shifts_forward() {
        // 2026-03-08 is a Sunday with the spring-forward gap at 02:00
        let config = SiteConfig::new(Los_Angeles).with_availability(
            WeeklyAvailability::default()
                .with_day(Weekday::Sun, AvailabilityWindow::new(hm(2, 30), hm(4, 0))),
        );
        let mt = MeetingType::new("30", "Half hour", 30);

        let slots = generate_candidates(&config, date(2026, 3, 8), &mt).unwrap();
        // 02:30 maps to 03:30 PDT, window end is 04:00 PDT
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, utc(2026, 3, 8, 10, 30));
    }

    proptest! {
        #[test]
        fn candidates_fit_window_and_are_spaced(
            start_quarter in 0u32..64,
            len_quarters in 1u32..32,
            duration in prop::sample::select(vec![15u32, 30, 45, 60, 90]),
        ) {
            let start_min = start_quarter * 15;
            let end_min = (start_min + len_quarters * 15).min(23 * 60 + 59);
            prop_assume!(end_min > start_min);

            let start = NaiveTime::from_hms_opt(start_min / 60, start_min % 60, 0).unwrap();
            let end = NaiveTime::from_hms_opt(end_min / 60, end_min % 60, 0).unwrap();
            let config = monday_config(Tz::UTC, start, end);
            let mt = MeetingType::new("m", "M", duration);
            let day = date(2026, 2, 9);

            let slots = generate_candidates(&config, day, &mt).unwrap();

            let window_start = local_to_utc(day, start, &Tz::UTC).unwrap();
            let window_end = local_to_utc(day, end, &Tz::UTC).unwrap();
            let window_minutes = i64::from(end_min - start_min);

            prop_assert!(slots.len() as i64 <= window_minutes / SLOT_INTERVAL_MINUTES + 1);
            for slot in &slots {
                prop_assert_eq!(slot.end - slot.start, Duration::minutes(i64::from(duration)));
                prop_assert!(slot.start >= window_start);
                prop_assert!(slot.end <= window_end);
            }
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[1].start - pair[0].start, Duration::minutes(SLOT_INTERVAL_MINUTES));
            }
        }
    }
}
