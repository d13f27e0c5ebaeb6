//! `meetbook book`: submit a booking.

use meetbook_protocol::{BookingRequest, BookingResponse, Request, Response};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

use super::{client, into_result, print_json, unexpected};

pub async fn run(cli: &Cli, config: &AppConfig, booking: BookingRequest) -> ClientResult<()> {
    let response = into_result(client(cli, config).send(Request::book(booking)).await?)?;
    let Response::Booking { booking } = response else {
        return Err(unexpected(&response));
    };

    if cli.json {
        print_json(&booking)?;
    } else if booking.success {
        for line in render_confirmation(&booking) {
            println!("{}", line);
        }
    }

    if booking.success {
        Ok(())
    } else {
        Err(ClientError::Server(format!(
            "{} ({})",
            booking.error.as_deref().unwrap_or("booking failed"),
            booking.status
        )))
    }
}

fn render_confirmation(booking: &BookingResponse) -> Vec<String> {
    let mut lines = vec!["Booked.".to_string()];
    if let Some(ref id) = booking.event_id {
        lines.push(format!("  event: {}", id));
    }
    if let (Some(start), Some(end)) = (booking.start_time, booking.end_time) {
        lines.push(format!("  when:  {} - {}", start.to_rfc3339(), end.to_rfc3339()));
    }
    match booking.meet_link.as_deref() {
        Some(link) if !link.is_empty() => lines.push(format!("  join:  {}", link)),
        _ => lines.push("  join:  (link not ready yet, check the calendar invite)".to_string()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn confirmation_with_link() {
        let start = Utc.with_ymd_and_hms(2026, 2, 9, 17, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 9, 17, 30, 0).unwrap();
        let lines = render_confirmation(&BookingResponse::created(
            "evt-1",
            "https://meet.google.com/abc-defg-hij",
            start,
            end,
        ));
        assert_eq!(lines[0], "Booked.");
        assert_eq!(lines[1], "  event: evt-1");
        assert_eq!(lines[3], "  join:  https://meet.google.com/abc-defg-hij");
    }

    #[test]
    fn confirmation_without_link() {
        let start = Utc.with_ymd_and_hms(2026, 2, 9, 17, 0, 0).unwrap();
        let lines = render_confirmation(&BookingResponse::created("evt-2", "", start, start));
        assert!(lines.last().unwrap().contains("not ready"));
    }
}
