//! `meetbook slots`: bookable slots for one date.

use chrono_tz::Tz;

use meetbook_protocol::{Request, Response, SlotQuery, SlotsResponse};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::ClientResult;

use super::{client, display_timezone, into_result, local_time, print_json, unexpected};

pub async fn run(
    cli: &Cli,
    config: &AppConfig,
    meeting_type: &str,
    date: &str,
    timezone: Option<&str>,
) -> ClientResult<()> {
    let mut query = SlotQuery::new(meeting_type, date);
    if let Some(tz) = timezone {
        query = query.with_timezone(tz);
    }

    let response = into_result(client(cli, config).send(Request::get_slots(query)).await?)?;
    let Response::Slots { slots } = response else {
        return Err(unexpected(&response));
    };

    if cli.json {
        return print_json(&slots);
    }

    // The server echoes the timezone it resolved.
    let tz = display_timezone(Some(timezone.unwrap_or(slots.timezone.as_str())))?;
    for line in render(&slots, tz) {
        println!("{}", line);
    }
    Ok(())
}

fn render(response: &SlotsResponse, tz: Tz) -> Vec<String> {
    if response.slots.is_empty() {
        return vec![format!("No available slots on {}.", response.date)];
    }

    let mut lines = vec![format!(
        "{}: {} slots on {} ({})",
        response.meeting_type.title,
        response.slots.len(),
        response.date,
        tz.name()
    )];
    lines.extend(response.slots.iter().map(|slot| {
        format!(
            "  {} - {}  {}",
            local_time(slot.start_time, tz),
            local_time(slot.end_time, tz),
            slot.start_time.to_rfc3339()
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use meetbook_core::{MeetingType, TimeSlot};

    fn response(slots: Vec<TimeSlot>) -> SlotsResponse {
        SlotsResponse {
            date: NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            timezone: "America/Los_Angeles".to_string(),
            meeting_type: MeetingType::new("30", "30 minute call", 30),
            slots,
        }
    }

    #[test]
    fn renders_in_guest_timezone() {
        let start = Utc.with_ymd_and_hms(2026, 2, 9, 17, 0, 0).unwrap();
        let slots = vec![TimeSlot {
            start_time: start,
            end_time: start + Duration::minutes(30),
        }];

        let lines = render(&response(slots), chrono_tz::Europe::London);
        assert_eq!(lines[0], "30 minute call: 1 slots on 2026-02-09 (Europe/London)");
        assert!(lines[1].starts_with("  17:00 - 17:30"));
        assert!(lines[1].ends_with("2026-02-09T17:00:00+00:00"));
    }

    #[test]
    fn renders_empty_day() {
        let lines = render(&response(Vec::new()), Tz::UTC);
        assert_eq!(lines, vec!["No available slots on 2026-02-09."]);
    }
}
